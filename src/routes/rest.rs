//! Convention based REST routing.
//!
//! A resource exposes handlers for the operations it supports, [`crud`] turns
//! them into routes under a path template:
//!
//! ```text
//!   POST   /path              create
//!   GET    /path              list
//!   GET    /path/{item}       fetch
//!   PUT    /path/{item}       update
//!   DELETE /path/{item}       delete
//! ```
//!
//! A `:` segment nests a resource under its parent, `conversations/:/messages`
//! expands to `/conversations/{conversation}/messages` and
//! `/conversations/{conversation}/messages/{message}`.

use actix_web::{http::Method, web, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    List,
    Fetch,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::List,
        Operation::Fetch,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn method(self) -> Method {
        match self {
            Operation::Create => Method::POST,
            Operation::List | Operation::Fetch => Method::GET,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Whether the operation addresses a single item rather than the collection.
    pub fn on_item(self) -> bool {
        matches!(
            self,
            Operation::Fetch | Operation::Update | Operation::Delete
        )
    }
}

/// A resource implements only the operations it supports; the rest stay `None`.
/// Returned routes carry the handler only, the HTTP method is set by [`crud`].
pub trait Resource {
    fn create(&self) -> Option<Route> {
        None
    }

    fn list(&self) -> Option<Route> {
        None
    }

    fn fetch(&self) -> Option<Route> {
        None
    }

    fn update(&self) -> Option<Route> {
        None
    }

    fn delete(&self) -> Option<Route> {
        None
    }

    fn route(&self, operation: Operation) -> Option<Route> {
        match operation {
            Operation::Create => self.create(),
            Operation::List => self.list(),
            Operation::Fetch => self.fetch(),
            Operation::Update => self.update(),
            Operation::Delete => self.delete(),
        }
    }

    fn capabilities(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|operation| self.route(*operation).is_some())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestPaths {
    /// e.g. `/conversations/{conversation}/messages`
    pub collection: String,
    /// e.g. `/conversations/{conversation}/messages/{message}`
    pub item: String,
    /// Name of the item segment, e.g. `message`
    pub param: String,
}

fn singular(segment: &str) -> &str {
    match segment.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem,
        _ => segment,
    }
}

pub fn expand_template(template: &str) -> RestPaths {
    let segments: Vec<&str> = template.trim_matches('/').split('/').collect();

    let expanded: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| match *segment {
            ":" => {
                let parent = i.checked_sub(1).map_or("id", |prev| segments[prev]);
                format!("{{{}}}", singular(parent))
            }
            segment => segment.to_string(),
        })
        .collect();

    let last = segments.last().copied().unwrap_or_default();
    let param = singular(last).to_string();
    let collection = format!("/{}", expanded.join("/"));
    let item = format!("{}/{{{}}}", collection, param);

    RestPaths {
        collection,
        item,
        param,
    }
}

/// Registers every operation `resource` supports under `template`.
pub fn crud<R: Resource>(
    cfg: &mut web::ServiceConfig,
    template: &str,
    resource: &R,
) -> RestPaths {
    let paths = expand_template(template);

    let mut collection = web::resource(paths.collection.as_str());
    let mut item = web::resource(paths.item.as_str());
    let (mut has_collection, mut has_item) = (false, false);

    for operation in Operation::ALL {
        let Some(route) = resource.route(operation) else {
            continue;
        };
        let route = route.method(operation.method());
        if operation.on_item() {
            tracing::debug!("{} {} -> {:?}", operation.method(), paths.item, operation);
            item = item.route(route);
            has_item = true;
        } else {
            tracing::debug!("{} {} -> {:?}", operation.method(), paths.collection, operation);
            collection = collection.route(route);
            has_collection = true;
        }
    }

    if has_collection {
        cfg.service(collection);
    }
    if has_item {
        cfg.service(item);
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_and_read_body, call_service, init_service, read_body, TestRequest};
    use actix_web::{App, HttpRequest, HttpResponse};

    #[test]
    fn flat_template_expands() {
        let paths = expand_template("conversations");
        assert_eq!(paths.collection, "/conversations");
        assert_eq!(paths.item, "/conversations/{conversation}");
        assert_eq!(paths.param, "conversation");

        assert_eq!(expand_template("/conversations/"), paths);
    }

    #[test]
    fn placeholder_takes_the_parent_name() {
        let paths = expand_template("conversations/:/messages");
        assert_eq!(paths.collection, "/conversations/{conversation}/messages");
        assert_eq!(
            paths.item,
            "/conversations/{conversation}/messages/{message}"
        );
        assert_eq!(paths.param, "message");
    }

    #[test]
    fn singular_keeps_short_and_unpluralized_names() {
        assert_eq!(singular("s"), "s");
        assert_eq!(singular("news"), "new");
        assert_eq!(singular("staff"), "staff");
    }

    async fn echo(req: HttpRequest) -> HttpResponse {
        let params: Vec<String> = req
            .match_info()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        HttpResponse::Ok().body(format!("{} {}", req.method(), params.join(",")))
    }

    struct Everything;

    impl Resource for Everything {
        fn create(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
        fn list(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
        fn fetch(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
        fn update(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
        fn delete(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
    }

    struct ReadOnly;

    impl Resource for ReadOnly {
        fn list(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
        fn fetch(&self) -> Option<Route> {
            Some(web::route().to(echo))
        }
    }

    #[test]
    fn capabilities_follow_implemented_operations() {
        assert_eq!(Everything.capabilities(), Operation::ALL.to_vec());
        assert_eq!(
            ReadOnly.capabilities(),
            vec![Operation::List, Operation::Fetch]
        );
    }

    #[actix_web::test]
    async fn all_verbs_are_registered() {
        let app = init_service(App::new().configure(|cfg| {
            crud(cfg, "things", &Everything);
        }))
        .await;

        let req = TestRequest::post().uri("/things").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_body(resp).await, "POST ");

        let cases = [
            (TestRequest::get().uri("/things"), "GET "),
            (TestRequest::get().uri("/things/7"), "GET thing=7"),
            (TestRequest::put().uri("/things/7"), "PUT thing=7"),
            (TestRequest::delete().uri("/things/7"), "DELETE thing=7"),
        ];
        for (req, expected) in cases {
            let body = call_and_read_body(&app, req.to_request()).await;
            assert_eq!(body, expected);
        }
    }

    #[actix_web::test]
    async fn unsupported_operations_are_not_routed() {
        let app = init_service(App::new().configure(|cfg| {
            crud(cfg, "things/:/parts", &ReadOnly);
        }))
        .await;

        let resp = call_service(
            &app,
            TestRequest::get().uri("/things/3/parts/9").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_body(resp).await, "GET thing=3,part=9");

        let cases = [
            (
                TestRequest::post().uri("/things/3/parts"),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
            (
                TestRequest::delete().uri("/things/3/parts/9"),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
            (TestRequest::get().uri("/things/3"), StatusCode::NOT_FOUND),
        ];
        for (req, status) in cases {
            let resp = call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), status);
        }
    }
}
