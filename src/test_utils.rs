// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-in for the control plane API, used by tests.
//!
//! Serves get/list/create/replace for any namespaced kind, keeps the status
//! subresource separate from the main resource and rejects writes carrying a
//! stale resourceVersion, so the real `kube::Api` code paths run against it.

use crate::constants::labels;
use crate::kubernetes::ApiClient;
use crate::types::application::GitTarget;
use crate::types::{Application, ApplicationSpec, Build, BuildState};
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use kube::api::PostParams;
use kube::client::Body;
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

#[derive(Default)]
struct State {
    /// Objects keyed by (collection path, name)
    objects: BTreeMap<(String, String), Value>,
    resource_version: u64,
    failures: Vec<InjectedFailure>,
}

struct InjectedFailure {
    method: Method,
    /// Only requests whose path contains this fragment
    path: Option<String>,
    remaining: usize,
    code: u16,
}

/// Where a request points to
struct Target {
    collection: String,
    namespace: String,
    name: Option<String>,
    status: bool,
}

fn parse_target(path: &str) -> Option<Target> {
    let (prefix, rest) = path.split_once("/namespaces/")?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    let (namespace, plural, name, status) = match segments.as_slice() {
        [ns, plural] => (*ns, *plural, None, false),
        [ns, plural, name] => (*ns, *plural, Some(*name), false),
        [ns, plural, name, "status"] => (*ns, *plural, Some(*name), true),
        _ => return None,
    };

    Some(Target {
        collection: format!("{}/namespaces/{}/{}", prefix, namespace, plural),
        namespace: namespace.to_string(),
        name: name.map(str::to_string),
        status,
    })
}

fn status_json(code: u16, reason: &str, message: String) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
}

fn label_selector(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k == "labelSelector")
        .map(|(_, v)| v.into_owned())
}

/// Equality-based selectors only: `a=b,c==d`
fn matches_selector(object: &Value, selector: Option<&str>) -> bool {
    let Some(selector) = selector.filter(|s| !s.is_empty()) else {
        return true;
    };

    selector.split(',').all(|clause| {
        let Some((key, value)) = clause.split_once('=') else {
            return false;
        };
        let value = value.trim_start_matches('=');
        object["metadata"]["labels"][key.trim()].as_str() == Some(value.trim())
    })
}

/// Stamp the write time the way the API server does, through managedFields
fn record_write(object: &mut Value, operation: &str, status: bool) {
    let mut entry = json!({
        "manager": "tidectl",
        "operation": operation,
        "apiVersion": object["apiVersion"].clone(),
        "fieldsType": "FieldsV1",
        "time": Time(Utc::now())
    });
    if status {
        entry["subresource"] = json!("status");
    }
    object["metadata"]["managedFields"] = json!([entry]);
}

#[derive(Clone, Default)]
pub struct FakeApiServer {
    state: Arc<Mutex<State>>,
}

impl FakeApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client bound to the "default" project
    pub fn api_client(&self) -> ApiClient {
        self.api_client_for("default")
    }

    pub fn api_client_for(&self, project: &str) -> ApiClient {
        ApiClient::new(Client::new(self.clone(), project.to_string()), project, "organization")
    }

    /// Answer the next `count` requests with `method` with an error status
    pub fn fail_next(&self, method: &str, count: usize, code: u16) {
        self.inject(method, None, count, code);
    }

    /// Like [`fail_next`](Self::fail_next), limited to paths containing `fragment`
    pub fn fail_next_matching(&self, method: &str, fragment: &str, count: usize, code: u16) {
        self.inject(method, Some(fragment.to_string()), count, code);
    }

    fn inject(&self, method: &str, path: Option<String>, count: usize, code: u16) {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        self.state.lock().unwrap().failures.push(InjectedFailure {
            method,
            path,
            remaining: count,
            code,
        });
    }

    /// Injected failures not yet served
    pub fn pending_failures(&self) -> usize {
        self.state.lock().unwrap().failures.iter().map(|f| f.remaining).sum()
    }

    /// Number of stored objects across all kinds
    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    fn handle(&self, method: &Method, path: &str, query: Option<&str>, body: &[u8]) -> (u16, Value) {
        let mut state = self.state.lock().unwrap();

        if let Some(failure) = state
            .failures
            .iter_mut()
            .find(|f| {
                f.method == *method
                    && f.remaining > 0
                    && f.path.as_deref().map_or(true, |fragment| path.contains(fragment))
            })
        {
            failure.remaining -= 1;
            let code = failure.code;
            return (code, status_json(code, "InternalError", "injected failure".to_string()));
        }

        let Some(target) = parse_target(path) else {
            return (404, status_json(404, "NotFound", format!("no route for {}", path)));
        };

        match (method.clone(), target.name.clone()) {
            (Method::GET, None) => {
                let selector = label_selector(query);
                let items: Vec<Value> = state
                    .objects
                    .iter()
                    .filter(|((collection, _), obj)| {
                        *collection == target.collection && matches_selector(obj, selector.as_deref())
                    })
                    .map(|(_, obj)| obj.clone())
                    .collect();
                let list = json!({
                    "apiVersion": "v1",
                    "kind": "List",
                    "metadata": { "resourceVersion": state.resource_version.to_string() },
                    "items": items
                });
                (200, list)
            }
            (Method::GET, Some(name)) => match state.objects.get(&(target.collection.clone(), name.clone())) {
                Some(obj) => (200, obj.clone()),
                None => (404, status_json(404, "NotFound", format!("{:?} not found", name))),
            },
            (Method::POST, None) => {
                let Ok(mut obj) = serde_json::from_slice::<Value>(body) else {
                    return (400, status_json(400, "BadRequest", "invalid body".to_string()));
                };
                let Some(name) = obj["metadata"]["name"].as_str().map(str::to_string) else {
                    return (422, status_json(422, "Invalid", "metadata.name is required".to_string()));
                };
                let key = (target.collection.clone(), name.clone());
                if state.objects.contains_key(&key) {
                    return (409, status_json(409, "AlreadyExists", format!("{:?} already exists", name)));
                }

                state.resource_version += 1;
                let rv = state.resource_version;
                if let Some(map) = obj.as_object_mut() {
                    map.remove("status");
                }
                obj["metadata"]["namespace"] = json!(target.namespace);
                obj["metadata"]["resourceVersion"] = json!(rv.to_string());
                obj["metadata"]["uid"] = json!(format!("uid-{}", rv));
                obj["metadata"]["creationTimestamp"] = json!(Time(Utc::now()));
                record_write(&mut obj, "Create", false);
                state.objects.insert(key, obj.clone());
                (201, obj)
            }
            (Method::PUT, Some(name)) => {
                let Ok(incoming) = serde_json::from_slice::<Value>(body) else {
                    return (400, status_json(400, "BadRequest", "invalid body".to_string()));
                };
                let key = (target.collection.clone(), name.clone());
                let Some(stored) = state.objects.get(&key).cloned() else {
                    return (404, status_json(404, "NotFound", format!("{:?} not found", name)));
                };

                if let Some(rv) = incoming["metadata"]["resourceVersion"].as_str() {
                    if Some(rv) != stored["metadata"]["resourceVersion"].as_str() {
                        return (
                            409,
                            status_json(
                                409,
                                "Conflict",
                                format!("the object {:?} has been modified", name),
                            ),
                        );
                    }
                }

                let mut updated = if target.status {
                    let mut updated = stored.clone();
                    updated["status"] = incoming["status"].clone();
                    updated
                } else {
                    let mut updated = incoming;
                    match stored.get("status") {
                        Some(status) => updated["status"] = status.clone(),
                        None => {
                            if let Some(map) = updated.as_object_mut() {
                                map.remove("status");
                            }
                        }
                    }
                    updated
                };

                state.resource_version += 1;
                for field in ["uid", "creationTimestamp", "namespace"] {
                    updated["metadata"][field] = stored["metadata"][field].clone();
                }
                updated["metadata"]["resourceVersion"] = json!(state.resource_version.to_string());
                record_write(&mut updated, "Update", target.status);
                state.objects.insert(key, updated.clone());
                (200, updated)
            }
            _ => (405, status_json(405, "MethodNotAllowed", format!("{} not supported", method))),
        }
    }
}

impl Service<Request<Body>> for FakeApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let server = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body: Bytes = body.collect().await.map_err(tower::BoxError::from)?.to_bytes();
            let (status, value) =
                server.handle(&parts.method, parts.uri.path(), parts.uri.query(), &body);

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&value)?))?)
        })
    }
}

/// Submit a minimal application, as a user would
pub async fn create_application(client: &ApiClient, name: &str) -> Application {
    let app = Application::new(
        name,
        ApplicationSpec {
            git: GitTarget {
                url: "https://git.example.org/app.git".to_string(),
                revision: "main".to_string(),
                ..Default::default()
            },
            hosts: vec![],
            config: Default::default(),
        },
    );
    client
        .api::<Application>()
        .create(&PostParams::default(), &app)
        .await
        .unwrap()
}

/// Create a dependent labelled with its parent's name, as the control plane would
pub async fn create_dependent<K>(client: &ApiClient, name: &str, parent: &str) -> K
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Serialize
        + DeserializeOwned
        + Debug,
{
    let labels = BTreeMap::from([(labels::APPLICATION_NAME, parent)]);
    let object: K = serde_json::from_value(json!({
        "apiVersion": K::api_version(&()),
        "kind": K::kind(&()),
        "metadata": {
            "name": name,
            "labels": labels
        },
        "spec": {}
    }))
    .unwrap();

    client
        .api::<K>()
        .create(&PostParams::default(), &object)
        .await
        .unwrap()
}

/// Read-modify-write the status subresource, as a controller would
pub async fn update_status<K, F>(api: &Api<K>, name: &str, f: F) -> K
where
    K: Resource + Clone + Serialize + DeserializeOwned + Debug,
    F: FnOnce(&mut K),
{
    let mut object = api.get(name).await.unwrap();
    f(&mut object);
    api.replace_status(name, &PostParams::default(), serde_json::to_vec(&object).unwrap())
        .await
        .unwrap()
}

pub async fn set_build_state(client: &ApiClient, name: &str, state: BuildState) -> Build {
    update_status(&client.api::<Build>(), name, |build: &mut Build| {
        build.status.get_or_insert_with(Default::default).build_status = Some(state);
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuildSpec, Condition};
    use kube::ResourceExt;

    #[test]
    fn test_parse_target() {
        let t = parse_target("/apis/apps.tide.dev/v1alpha1/namespaces/default/builds/b1/status").unwrap();
        assert_eq!(t.collection, "/apis/apps.tide.dev/v1alpha1/namespaces/default/builds");
        assert_eq!(t.name.as_deref(), Some("b1"));
        assert!(t.status);

        let t = parse_target("/api/v1/namespaces/default/secrets").unwrap();
        assert_eq!(t.namespace, "default");
        assert!(t.name.is_none());

        assert!(parse_target("/version").is_none());
    }

    #[tokio::test]
    async fn test_status_is_separate_from_spec() {
        let server = FakeApiServer::new();
        let api = server.api_client().api::<Build>();
        let mut build = Build::new("b1", BuildSpec::default());
        build.status = Some(Default::default());
        let created = api.create(&PostParams::default(), &build).await.unwrap();
        assert!(created.status.is_none());

        update_status(&api, "b1", |b: &mut Build| {
            b.status = Some(crate::types::BuildStatus {
                conditions: vec![Condition::available()],
                build_status: Some(BuildState::Running),
            });
        })
        .await;

        // a spec update keeps the stored status
        let mut current = api.get("b1").await.unwrap();
        current.spec.image = Some("registry.example.org/b1".to_string());
        current.status = None;
        let replaced = api.replace("b1", &PostParams::default(), &current).await.unwrap();
        assert_eq!(replaced.status.unwrap().build_status, Some(BuildState::Running));
        assert_eq!(server.object_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_resource_version_conflicts() {
        let server = FakeApiServer::new();
        let api = server.api_client().api::<Build>();
        let created = api
            .create(&PostParams::default(), &Build::new("b1", BuildSpec::default()))
            .await
            .unwrap();

        let mut first = created.clone();
        first.spec.image = Some("one".to_string());
        api.replace("b1", &PostParams::default(), &first).await.unwrap();

        let mut stale = created;
        stale.spec.image = Some("two".to_string());
        let err = api.replace("b1", &PostParams::default(), &stale).await.unwrap_err();
        assert!(matches!(err, kube::Error::Api(ref e) if e.code == 409));
        assert_eq!(api.get("b1").await.unwrap().spec.image.as_deref(), Some("one"));
        assert!(api.get("b1").await.unwrap().uid().is_some());
    }
}
