//! End-to-end resolution against realistic Api graphs.

use http::{Method, StatusCode};
use proptest::prelude::*;
use waypoint_core::fixtures::{mock, northwind_api, versioned_apis};
use waypoint_core::{Api, DispatchResult, Endpoint, Request, Resolution, Resolver};

struct Expect<'a> {
    endpoint: &'a str,
    endpoint_path: &'a str,
    collection: Option<&'a str>,
    entity: Option<&'a str>,
    subcollection: Option<&'a str>,
}

fn expect<'a>(
    endpoint: &'a str,
    endpoint_path: &'a str,
    collection: Option<&'a str>,
    entity: Option<&'a str>,
    subcollection: Option<&'a str>,
) -> Expect<'a> {
    Expect {
        endpoint,
        endpoint_path,
        collection,
        entity,
        subcollection,
    }
}

fn resolve<'r>(resolver: &'r Resolver, method: Method, url: &str) -> DispatchResult<Resolution<'r>> {
    let request = Request::new(method, url).unwrap();
    resolver.resolve(request.method(), request.path())
}

fn assert_status(resolver: &Resolver, method: Method, url: &str, status: StatusCode) {
    match resolve(resolver, method, url) {
        Ok(_) => assert_eq!(status, StatusCode::OK, "{url} resolved"),
        Err(err) => assert_eq!(err.status_code(), status, "{url}: {err}"),
    }
}

fn assert_route(resolver: &Resolver, method: Method, url: &str, expected: &Expect<'_>) {
    let resolution = resolve(resolver, method, url).unwrap_or_else(|err| panic!("{url}: {err}"));
    let route = &resolution.route;

    assert_eq!(resolution.endpoint.name(), expected.endpoint, "{url}");
    assert_eq!(route.endpoint_path.to_string(), expected.endpoint_path, "{url}");
    assert_eq!(route.collection_key(), expected.collection, "{url}");
    assert_eq!(route.entity_key(), expected.entity, "{url}");
    assert_eq!(route.subcollection_key(), expected.subcollection, "{url}");
}

fn endpoint_api() -> Api {
    Api::new("test")
        .with_action(mock("mock1").with_include_paths("*"))
        .with_endpoint(Endpoint::new("ep1").with_method(Method::GET).with_path("ep1/*"))
        .with_endpoint(Endpoint::new("ep2").with_method(Method::GET).with_path("ep2/"))
        .with_endpoint(
            Endpoint::new("ep3")
                .with_method(Method::GET)
                .with_path("bookstore/")
                .with_include_paths("books/*,categories,authors"),
        )
        .with_endpoint(
            Endpoint::new("ep4")
                .with_method(Method::GET)
                .with_path("other/data")
                .with_include_paths("table1,table2/*,other/data/*,data/*"),
        )
        .with_endpoint(
            Endpoint::new("ep5")
                .with_method(Method::GET)
                .with_path("cardealer")
                .with_include_paths("ford/*,gm/*"),
        )
        .with_endpoint(
            Endpoint::new("ep6")
                .with_method(Method::GET)
                .with_path("petstore/*")
                .with_exclude_paths("rat,snakes/bad,cats/*"),
        )
        .with_endpoint(
            Endpoint::new("ep7")
                .with_method(Method::GET)
                .with_path("gamestop/*")
                .with_include_paths("nintendo,xbox/*"),
        )
        .with_endpoint(
            Endpoint::new("ep8")
                .with_method(Method::GET)
                .with_path("carwash")
                .with_include_paths("regular,delux/*"),
        )
}

#[test]
fn url_forms_reach_the_same_endpoint() {
    let resolver = Resolver::new(vec![endpoint_api()]);
    for url in ["http://localhost/test/ep1", "/test/ep1", "test/ep1"] {
        assert_status(&resolver, Method::GET, url, StatusCode::OK);
    }
}

#[test]
fn unknown_api_is_bad_request() {
    let resolver = Resolver::new(vec![endpoint_api()]);
    assert_status(&resolver, Method::GET, "http://localhost/WRONG/ep1", StatusCode::BAD_REQUEST);

    let resolver = Resolver::new(vec![endpoint_api(), Api::new("other")]);
    assert_status(&resolver, Method::GET, "http://localhost/WRONG/ep1", StatusCode::BAD_REQUEST);
}

#[test]
fn endpoint_prefixes_and_keys() {
    let resolver = Resolver::new(vec![endpoint_api()]);

    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/ep1/collKey/entKey/relKey",
        &expect("ep1", "ep1", Some("collKey"), Some("entKey"), Some("relKey")),
    );
    assert_status(
        &resolver,
        Method::DELETE,
        "http://localhost/test/ep1/collKey/entKey/relKey",
        StatusCode::NOT_FOUND,
    );

    assert_status(&resolver, Method::GET, "test/ep2", StatusCode::OK);
    assert_status(&resolver, Method::GET, "http://localhost/test/ep2/", StatusCode::OK);
    assert_status(&resolver, Method::GET, "http://localhost/test/ep2/asdf", StatusCode::NOT_FOUND);
}

#[test]
fn include_lists_scope_the_subpath() {
    let resolver = Resolver::new(vec![endpoint_api()]);

    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/bookstore/books/1/author",
        &expect("ep3", "bookstore", Some("books"), Some("1"), Some("author")),
    );
    assert_status(
        &resolver,
        Method::GET,
        "http://localhost/test/bookstore/categories/fiction/books",
        StatusCode::NOT_FOUND,
    );
    assert_status(&resolver, Method::GET, "http://localhost/test/bookstore/cars/", StatusCode::NOT_FOUND);

    assert_route(
        &resolver,
        Method::GET,
        "/test/other/data/table1/",
        &expect("ep4", "other/data", Some("table1"), None, None),
    );
    assert_status(
        &resolver,
        Method::GET,
        "http://localhost/test/other/data/table1/asdfa/",
        StatusCode::NOT_FOUND,
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/other/data/table2/keyCol/relCol",
        &expect("ep4", "other/data", Some("table2"), Some("keyCol"), Some("relCol")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "test/other/data/data/keyCol/relCol",
        &expect("ep4", "other/data", Some("data"), Some("keyCol"), Some("relCol")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/other/data/other/data/relCol",
        &expect("ep4", "other/data", Some("other"), Some("data"), Some("relCol")),
    );

    assert_route(
        &resolver,
        Method::GET,
        "/test/cardealer/ford/explorer",
        &expect("ep5", "cardealer", Some("ford"), Some("explorer"), None),
    );
    assert_route(
        &resolver,
        Method::GET,
        "/test/cardealer/gm",
        &expect("ep5", "cardealer", Some("gm"), None, None),
    );

    assert_route(
        &resolver,
        Method::GET,
        "/test/gamestop/nintendo",
        &expect("ep7", "gamestop", Some("nintendo"), None, None),
    );
    assert_status(&resolver, Method::GET, "/test/gamestop/nintendo/game", StatusCode::NOT_FOUND);
    assert_route(
        &resolver,
        Method::GET,
        "/test/gamestop/xbox/somegame",
        &expect("ep7", "gamestop", Some("xbox"), Some("somegame"), None),
    );
    assert_status(&resolver, Method::GET, "/test/gamestop/nintendo/sega", StatusCode::NOT_FOUND);

    assert_status(&resolver, Method::GET, "/test/carwash/regular", StatusCode::OK);
    assert_status(&resolver, Method::GET, "/test/carwash/delux/wax", StatusCode::OK);
    assert_status(&resolver, Method::GET, "/test/carwash/basic", StatusCode::NOT_FOUND);
}

#[test]
fn exclude_lists_scope_the_subpath() {
    let resolver = Resolver::new(vec![endpoint_api()]);

    assert_route(
        &resolver,
        Method::GET,
        "/test/petstore/dogs/1234/breed",
        &expect("ep6", "petstore", Some("dogs"), Some("1234"), Some("breed")),
    );
    assert_status(&resolver, Method::GET, "/test/petstore/rat/", StatusCode::NOT_FOUND);
    assert_route(
        &resolver,
        Method::GET,
        "/test/petstore/rat/a_rat",
        &expect("ep6", "petstore", Some("rat"), Some("a_rat"), None),
    );
    assert_route(
        &resolver,
        Method::GET,
        "/test/petstore/snakes/good",
        &expect("ep6", "petstore", Some("snakes"), Some("good"), None),
    );
    assert_status(&resolver, Method::GET, "/test/petstore/snakes/bad/", StatusCode::NOT_FOUND);
    assert_route(
        &resolver,
        Method::GET,
        "/test/petstore/snakes/bad/butgood",
        &expect("ep6", "petstore", Some("snakes"), Some("bad"), Some("butgood")),
    );
    for url in ["/test/petstore/cats/", "/test/petstore/cats/nope", "/test/petstore/cats/nope/none"] {
        assert_status(&resolver, Method::GET, url, StatusCode::NOT_FOUND);
    }
}

#[test]
fn endpoints_without_paths() {
    let resolver = Resolver::new(vec![Api::new("test")
        .with_action(mock("mock1").with_include_paths("*"))
        .with_endpoint(
            Endpoint::new("ep1")
                .with_method(Method::GET)
                .with_exclude_paths("subpath/*"),
        )
        .with_endpoint(Endpoint::new("ep2").with_method(Method::GET).with_path("subpath/*"))]);

    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/colKey/entKey/relKey",
        &expect("ep1", "", Some("colKey"), Some("entKey"), Some("relKey")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/subpath/colKey/entKey/relKey",
        &expect("ep2", "subpath", Some("colKey"), Some("entKey"), Some("relKey")),
    );

    let resolver = Resolver::new(vec![Api::new("test")
        .with_action(mock("mock1").with_include_paths("*"))
        .with_endpoint(
            Endpoint::new("ep1")
                .with_method(Method::GET)
                .with_path("/")
                .with_include_paths("collection1/*,collection2/*"),
        )
        .with_endpoint(Endpoint::new("ep2").with_method(Method::GET).with_path("subpath3/*"))]);

    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/collection1/entKey/relKey",
        &expect("ep1", "", Some("collection1"), Some("entKey"), Some("relKey")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/collection2/entKey/relKey",
        &expect("ep1", "", Some("collection2"), Some("entKey"), Some("relKey")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/subpath3/colKey/entKey/relKey",
        &expect("ep2", "subpath3", Some("colKey"), Some("entKey"), Some("relKey")),
    );
    assert_status(&resolver, Method::GET, "http://localhost/test/elsewhere/1", StatusCode::NOT_FOUND);
}

#[test]
fn lone_unnamed_api() {
    let resolver = Resolver::new(vec![Api::unnamed().with_endpoint(
        Endpoint::new("ep0")
            .with_method(Method::GET)
            .with_path("endpoint_path/*")
            .with_action(mock("all")),
    )]);

    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/endpoint_path/12345",
        &expect("ep0", "endpoint_path", Some("12345"), None, None),
    );
}

#[test]
fn versions_select_distinct_apis() {
    let resolver = Resolver::new(versioned_apis());

    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/v1/colKey/entKey/relKey",
        &expect("ep1", "", Some("colKey"), Some("entKey"), Some("relKey")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/v1/subpath/colKey/entKey/relKey",
        &expect("ep2", "subpath", Some("colKey"), Some("entKey"), Some("relKey")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/v2/subpath/colKey/entKey/relKey",
        &expect("ep4", "subpath", Some("colKey"), Some("entKey"), Some("relKey")),
    );
    assert_route(
        &resolver,
        Method::GET,
        "http://localhost/test/v3/subpath/colKey/entKey/relKey",
        &expect("ep6", "subpath", Some("colKey"), Some("entKey"), Some("relKey")),
    );
    assert_status(&resolver, Method::GET, "http://localhost/test/v4/x", StatusCode::BAD_REQUEST);
}

#[test]
fn servlet_mapping_version_and_tenant() {
    let ep1 = || Endpoint::new("ep1").with_path("ep1/*");

    let resolver = Resolver::new(vec![Api::new("api1").with_endpoint(ep1()), Api::new("api2")]);
    let resolution = resolve(&resolver, Method::GET, "http://localhost:8080/api1/ep1").unwrap();
    assert_eq!(resolution.route.endpoint_path.to_string(), "ep1");
    assert_eq!(resolution.route.api_path.to_string(), "api1");

    let resolver = resolver.with_servlet_mapping("/some/servlet/path");
    let resolution = resolve(
        &resolver,
        Method::GET,
        "http://localhost:8080/some/servlet/path/api1/ep1",
    )
    .unwrap();
    assert_eq!(resolution.route.api_path.to_string(), "some/servlet/path/api1");

    let resolver = Resolver::new(vec![
        Api::new("api1").with_version("v1").with_endpoint(ep1()),
        Api::new("api2"),
    ])
    .with_servlet_mapping("/some/servlet/path");
    assert!(resolve(&resolver, Method::GET, "http://localhost:8080/some/servlet/path/api1/ep1").is_err());
    let resolution = resolve(
        &resolver,
        Method::GET,
        "http://localhost:8080/some/servlet/path/api1/v1/ep1",
    )
    .unwrap();
    assert_eq!(resolution.route.api_path.to_string(), "some/servlet/path/api1/v1");

    let resolver = Resolver::new(vec![
        Api::new("api1")
            .with_version("v1")
            .with_multi_tenant(true)
            .with_endpoint(ep1()),
        Api::new("api2"),
    ])
    .with_servlet_mapping("/some/servlet/path");
    let resolution = resolve(
        &resolver,
        Method::GET,
        "http://localhost:8080/some/servlet/path/api1/v1/acme/ep1",
    )
    .unwrap();
    assert_eq!(resolution.route.endpoint_path.to_string(), "ep1");
    assert_eq!(resolution.route.api_path.to_string(), "some/servlet/path/api1/v1/acme");
    assert_eq!(resolution.route.tenant.as_deref(), Some("acme"));
}

#[test]
fn include_captures_reach_params() {
    let resolver = Resolver::new(vec![Api::new("shop").with_endpoint(
        Endpoint::new("books")
            .with_path("{store}/*")
            .with_include_paths("books/{id:[0-9]{1,8}}"),
    )]);

    let resolution = resolve(&resolver, Method::GET, "/shop/north/books/42").unwrap();
    assert_eq!(resolution.route.params.get("store"), Some("north"));
    assert_eq!(resolution.route.params.get("id"), Some("42"));

    assert_status(&resolver, Method::GET, "/shop/north/books/123456789", StatusCode::NOT_FOUND);
}

#[test]
fn resolution_is_idempotent() {
    let resolver = Resolver::new(vec![endpoint_api()]);
    let url = "http://localhost/test/petstore/dogs/1234/breed";

    let first = resolve(&resolver, Method::GET, url).unwrap();
    let second = resolve(&resolver, Method::GET, url).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.action_names(), vec!["mock1"]);
}

proptest! {
    #[test]
    fn northwind_subpath_keys_follow_the_endpoint(
        backend in prop::sample::select(vec!["source", "h2", "mysql", "dynamo"]),
        keys in prop::collection::vec("[a-z0-9]{1,10}", 0..4),
    ) {
        let resolver = Resolver::new(vec![northwind_api()]);
        let url = format!("/northwind/{backend}/{}", keys.join("/"));
        let resolution = resolve(&resolver, Method::GET, &url).unwrap();

        prop_assert_eq!(resolution.endpoint.name(), backend);
        prop_assert_eq!(resolution.route.endpoint_path.to_string(), backend);
        prop_assert_eq!(resolution.route.subpath.to_string(), keys.join("/"));
        prop_assert_eq!(resolution.route.collection_key(), keys.first().map(String::as_str));
        prop_assert_eq!(resolution.route.entity_key(), keys.get(1).map(String::as_str));
    }
}
