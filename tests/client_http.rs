use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pizzaria_caixa::client::{
    ApiError, ClientMode, ExpenseApi, ExpenseDraft, ExpenseUpdate, PizzariaClient,
};
use pizzaria_caixa::types::{ExpenseId, Status};

#[derive(Debug)]
struct Seen {
    request_line: String,
    body: String,
}

fn serve_one(status: u16, body: &'static str) -> (String, mpsc::Receiver<Seen>) {
    serve(vec![(status, body)])
}

fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();

            let mut buf = Vec::new();
            let mut header_end = None;
            while header_end.is_none() {
                let mut tmp = [0u8; 1024];
                let n = stream.read(&mut tmp).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&tmp[..n]);
                if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    header_end = Some(i + 4);
                }
            }

            let header_end = header_end.expect("did not receive full headers");
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let lower = headers.to_lowercase();

            let content_length = lower
                .lines()
                .find_map(|l| l.strip_prefix("content-length: "))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let mut body_buf = buf[header_end..].to_vec();
            while body_buf.len() < content_length {
                let mut tmp = vec![0u8; content_length - body_buf.len()];
                let n = stream.read(&mut tmp).unwrap();
                if n == 0 {
                    break;
                }
                body_buf.extend_from_slice(&tmp[..n]);
            }
            let req_body = String::from_utf8_lossy(&body_buf[..content_length]).to_string();

            tx.send(Seen {
                request_line: headers.lines().next().unwrap_or_default().to_string(),
                body: req_body,
            })
            .unwrap();

            let resp = format!(
                "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(resp.as_bytes()).unwrap();
        }
    });

    (format!("http://{}", addr), rx)
}

fn client(base_url: String) -> PizzariaClient {
    PizzariaClient::new(ClientMode::Http {
        base_url,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[test]
fn list_expenses_hits_versioned_collection() {
    let (base_url, seen) = serve_one(
        200,
        r#"[{"id":1,"descricao":"Motoboy","categoria":"Motoboys","valor":50.0,"status":"pendente","created_at":"2024-05-01T10:00:00"}]"#,
    );
    let expenses = client(base_url).list_expenses().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category, "Motoboys");

    let seen = seen.recv().unwrap();
    assert_eq!(seen.request_line, "GET /api/v1/despesas HTTP/1.1");
}

#[test]
fn one_client_serves_a_whole_session() {
    let (base_url, seen) = serve(vec![
        (200, "[]"),
        (
            200,
            r#"{"total_despesas":0,"total_valor":0,"despesas_pendentes":0,"despesas_pagas":0}"#,
        ),
        (
            200,
            r##"[{"id":1,"nome":"Motoboys","descricao":null,"cor":"#28a745"}]"##,
        ),
    ]);
    let api = client(base_url);
    assert!(api.list_expenses().unwrap().is_empty());
    assert_eq!(api.statistics().unwrap().total_expenses, 0);
    assert_eq!(api.list_categories().unwrap()[0].name, "Motoboys");

    let lines = seen
        .iter()
        .take(3)
        .map(|s| s.request_line)
        .collect::<Vec<_>>();
    assert_eq!(
        lines,
        [
            "GET /api/v1/despesas HTTP/1.1",
            "GET /api/v1/estatisticas HTTP/1.1",
            "GET /api/v1/categorias HTTP/1.1",
        ]
    );
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let (base_url, seen) = serve_one(
        200,
        r#"{"total_despesas":0,"total_valor":0,"despesas_pendentes":0,"despesas_pagas":0}"#,
    );
    client(format!("{base_url}/")).statistics().unwrap();
    assert_eq!(
        seen.recv().unwrap().request_line,
        "GET /api/v1/estatisticas HTTP/1.1"
    );
}

#[test]
fn create_posts_portuguese_field_names() {
    let (base_url, seen) = serve_one(
        201,
        r#"{"id":12,"descricao":"Queijo","categoria":"Produtos","valor":95.4,"status":"pendente","created_at":"2024-06-01T12:00:00"}"#,
    );
    let created = client(base_url)
        .create_expense(&ExpenseDraft {
            description: "Queijo".to_string(),
            category: "Produtos".to_string(),
            amount: 95.4,
            due_date: None,
            payment_date: None,
            notes: None,
            status: Status::Pending,
        })
        .unwrap();
    assert_eq!(created.id, ExpenseId::new(12));

    let seen = seen.recv().unwrap();
    assert_eq!(seen.request_line, "POST /api/v1/despesas HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body["descricao"], "Queijo");
    assert_eq!(body["categoria"], "Produtos");
    assert_eq!(body["status"], "pendente");
    assert!(body["data_vencimento"].is_null());
}

#[test]
fn status_change_puts_only_the_status() {
    let (base_url, seen) = serve_one(
        200,
        r#"{"id":7,"descricao":"Delivery","categoria":"Motoboys","valor":50.0,"status":"pago"}"#,
    );
    let updated = client(base_url)
        .update_expense(
            ExpenseId::new(7),
            &ExpenseUpdate::Status {
                status: Status::Paid,
            },
        )
        .unwrap();
    assert_eq!(updated.status, Status::Paid);

    let seen = seen.recv().unwrap();
    assert_eq!(seen.request_line, "PUT /api/v1/despesas/7 HTTP/1.1");
    assert_eq!(seen.body, r#"{"status":"pago"}"#);
}

#[test]
fn delete_accepts_informational_body() {
    let (base_url, seen) = serve_one(200, r#"{"message":"Despesa deletada com sucesso"}"#);
    client(base_url).delete_expense(ExpenseId::new(9)).unwrap();
    assert_eq!(
        seen.recv().unwrap().request_line,
        "DELETE /api/v1/despesas/9 HTTP/1.1"
    );
}

#[test]
fn seed_posts_to_seed_endpoint() {
    let (base_url, seen) = serve_one(200, "");
    client(base_url).seed_categories().unwrap();
    assert_eq!(
        seen.recv().unwrap().request_line,
        "POST /api/v1/seed-categorias HTTP/1.1"
    );
}

#[test]
fn non_success_status_is_an_error() {
    let (base_url, _seen) = serve_one(500, r#"{"detail":"boom"}"#);
    let err = client(base_url).list_expenses().unwrap_err();
    match &err {
        ApiError::Status { status, path, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(path, "/api/v1/despesas");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("http error 500"));
}

#[test]
fn unexpected_shape_is_a_decode_error() {
    let (base_url, _seen) = serve_one(200, r#"{"not":"a list"}"#);
    let err = client(base_url).list_expenses().unwrap_err();
    assert!(matches!(
        err,
        ApiError::Decode {
            operation: "ListExpenses",
            ..
        }
    ));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}")).list_expenses().unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
