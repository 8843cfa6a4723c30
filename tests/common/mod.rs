// In-process books backend used by the integration tests.
//
// Mirrors the REST resource the client talks to, including the credential
// the real service leaks inside `usuario`.
#![allow(dead_code)]

use axum::Router;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
struct StoredBook {
    titulo: String,
    descricao: Option<String>,
    ano: Option<i64>,
    autores: Vec<String>,
    codigo_usuario: Option<u64>,
    image: Option<String>,
}

#[derive(Default)]
pub struct BackendState {
    next_code: AtomicU64,
    books: Mutex<BTreeMap<u64, StoredBook>>,
    /// `search` parameter of every list request, in order.
    pub searches: Mutex<Vec<Option<String>>>,
    pub put_count: AtomicU64,
    /// (code, file name, size) of every cover upload.
    pub uploads: Mutex<Vec<(u64, String, usize)>>,
}

pub struct TestBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState {
            next_code: AtomicU64::new(1),
            ..Default::default()
        });
        let router = Router::new()
            .route("/livros/", get(list_books).post(create_book))
            .route(
                "/livros/{code}",
                get(get_book)
                    .put(update_book)
                    .patch(set_cover)
                    .delete(delete_book),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            base_url: format!("http://{addr}/livros"),
            state,
        }
    }

    pub fn searches(&self) -> Vec<Option<String>> {
        self.state.searches.lock().unwrap().clone()
    }

    pub fn put_count(&self) -> u64 {
        self.state.put_count.load(Ordering::SeqCst)
    }
}

fn user_json(code: u64) -> Value {
    json!({
        "codigo": code,
        "nome": format!("user{code}"),
        "email": format!("user{code}@library.test"),
        "senha": "hunter2",
        "tipo": if code == 1 { "FUNCIONARIO" } else { "ALUNO" },
    })
}

fn book_json(code: u64, b: &StoredBook) -> Value {
    let mut v = json!({
        "codigo": code,
        "titulo": b.titulo,
        "autores": b.autores,
    });
    if let Some(d) = &b.descricao {
        v["descricao"] = json!(d);
    }
    if let Some(a) = b.ano {
        v["ano"] = json!(a);
    }
    if let Some(u) = b.codigo_usuario {
        v["usuario"] = user_json(u);
    }
    if let Some(i) = &b.image {
        v["image"] = json!(i);
    }
    v
}

fn stored_from(body: &Value) -> StoredBook {
    StoredBook {
        titulo: body["titulo"].as_str().unwrap_or_default().to_string(),
        descricao: body["descricao"].as_str().map(str::to_string),
        ano: body["ano"].as_i64(),
        autores: body["autores"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|s| s.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        codigo_usuario: body["codigoUsuario"].as_u64(),
        image: None,
    }
}

async fn list_books(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let search = params.get("search").cloned();
    state.searches.lock().unwrap().push(search.clone());
    let needle = search.unwrap_or_default().to_lowercase();
    let books = state.books.lock().unwrap();
    let itens: Vec<Value> = books
        .iter()
        .filter(|(_, b)| {
            needle.is_empty()
                || b.titulo.to_lowercase().contains(&needle)
                || b.autores.iter().any(|a| a.to_lowercase().contains(&needle))
        })
        .map(|(code, b)| book_json(*code, b))
        .collect();
    Json(json!({ "total": itens.len(), "itens": itens }))
}

async fn create_book(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let code = state.next_code.fetch_add(1, Ordering::SeqCst);
    let stored = stored_from(&body);
    let out = book_json(code, &stored);
    state.books.lock().unwrap().insert(code, stored);
    (StatusCode::CREATED, Json(out))
}

async fn get_book(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    let books = state.books.lock().unwrap();
    let b = books.get(&code).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(book_json(code, b)))
}

async fn update_book(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    state.put_count.fetch_add(1, Ordering::SeqCst);
    let mut books = state.books.lock().unwrap();
    let existing = books.get_mut(&code).ok_or(StatusCode::NOT_FOUND)?;
    let image = existing.image.take();
    *existing = StoredBook {
        image,
        ..stored_from(&body)
    };
    Ok(Json(book_json(code, existing)))
}

async fn set_cover(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<u64>,
    mut multipart: Multipart,
) -> StatusCode {
    if !state.books.lock().unwrap().contains_key(&code) {
        return StatusCode::NOT_FOUND;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let Ok(data) = field.bytes().await else {
            return StatusCode::BAD_REQUEST;
        };
        state
            .uploads
            .lock()
            .unwrap()
            .push((code, name.clone(), data.len()));
        if let Some(b) = state.books.lock().unwrap().get_mut(&code) {
            b.image = Some(format!("/covers/{code}/{name}"));
        }
        return StatusCode::NO_CONTENT;
    }
    StatusCode::BAD_REQUEST
}

async fn delete_book(State(state): State<Arc<BackendState>>, Path(code): Path<u64>) -> StatusCode {
    match state.books.lock().unwrap().remove(&code) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}
