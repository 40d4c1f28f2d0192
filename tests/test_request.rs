use tideway::http::env;
use tideway::http::parser::ParseError;
use tideway::http::request::{Method, Request};

const POST: &[u8] = b"POST /api/items?sort=desc HTTP/1.1\r\n\
Host: example.com:8080\r\n\
Content-Type: application/json\r\n\
Content-Length: 13\r\n\
X-Request-Id: abc-123\r\n\
\r\n\
{\"id\": \"a\"}\r\n";

#[test]
fn test_request_parse_in_one_call() {
    let mut req = Request::new();

    assert!(req.parse(POST).unwrap());
    assert!(req.is_complete());
}

#[test]
fn test_request_parse_is_fragmentation_independent() {
    let mut whole = Request::new();
    assert!(whole.parse(POST).unwrap());

    for split in [1, 2, 5, 17, 64] {
        let mut req = Request::new();
        let pieces: Vec<_> = POST.chunks(split).collect();
        let (last, init) = pieces.split_last().unwrap();

        for piece in init {
            assert!(!req.parse(piece).unwrap(), "complete too early at split {split}");
        }
        assert!(req.parse(last).unwrap());
        assert_eq!(req.env(), whole.env());
    }
}

#[test]
fn test_request_env_contents() {
    let mut req = Request::new();
    req.parse(POST).unwrap();
    let env = req.env().unwrap();

    assert_eq!(env.get(env::REQUEST_METHOD), Some("POST"));
    assert_eq!(env.get(env::REQUEST_URI), Some("/api/items?sort=desc"));
    assert_eq!(env.path(), "/api/items");
    assert_eq!(env.query(), "sort=desc");
    assert_eq!(env.get(env::SERVER_PROTOCOL), Some("HTTP/1.1"));
    assert_eq!(env.get(env::SERVER_NAME), Some("example.com"));
    assert_eq!(env.get(env::SERVER_PORT), Some("8080"));
    assert_eq!(env.get(env::CONTENT_TYPE), Some("application/json"));
    assert_eq!(env.get(env::CONTENT_LENGTH), Some("13"));
    assert_eq!(env.get("HTTP_X_REQUEST_ID"), Some("abc-123"));
    assert_eq!(env.get("HTTP_CONTENT_TYPE"), None);
    assert_eq!(&env.input()[..], b"{\"id\": \"a\"}\r\n");
}

#[test]
fn test_request_env_defaults_without_host() {
    let mut req = Request::new();
    req.parse(b"GET / HTTP/1.0\r\n\r\n").unwrap();
    let env = req.env().unwrap();

    assert_eq!(env.get(env::SERVER_NAME), Some("localhost"));
    assert_eq!(env.get(env::SERVER_PORT), Some("80"));
    assert_eq!(env.query(), "");
}

#[test]
fn test_request_forwarded_for() {
    let mut req = Request::new();
    req.parse(b"GET / HTTP/1.1\r\nX-Forwarded-For: 198.51.100.4\r\n\r\n")
        .unwrap();

    assert_eq!(req.forwarded_for(), Some("198.51.100.4"));
}

#[test]
fn test_request_without_forwarded_for() {
    let mut req = Request::new();
    req.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(req.forwarded_for(), None);
}

#[test]
fn test_request_invalid_input_is_an_error() {
    let mut req = Request::new();

    let result = req.parse(b"GET / HTTP/1.1\r\nNoColon\r\n\r\n");
    assert!(matches!(result, Err(ParseError::InvalidHeader)));
    assert!(!req.is_complete());
}

#[test]
fn test_request_header_limit() {
    let mut req = Request::with_max_header(32);

    assert!(!req.parse(b"GET / HTTP/1.1\r\n").unwrap());
    let result = req.parse(b"X-Long-Header-Name: some long value\r\n");
    assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
}

#[test]
fn test_request_close_is_idempotent() {
    let mut req = Request::new();
    req.close();
    req.close();

    assert!(req.is_closed());
    assert!(!req.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap());
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(Method::from_str("INVALID"), None);
    assert_eq!(Method::from_str("get"), None); // Case-sensitive
}

#[test]
fn test_request_method_round_trip_name() {
    for name in ["GET", "PUT", "DELETE", "CONNECT", "TRACE"] {
        assert_eq!(Method::from_str(name).unwrap().as_str(), name);
    }
}

#[test]
fn test_request_env_keeps_path_as_sent() {
    let mut req = Request::new();
    assert!(req.parse(b"GET //static/../a.css?v=2 HTTP/1.1\r\n\r\n").unwrap());
    let env = req.env().unwrap();

    assert_eq!(env.path(), "//static/../a.css");
    assert_eq!(env.query(), "v=2");
    assert_eq!(env.get(env::REQUEST_URI), Some("//static/../a.css?v=2"));
}
