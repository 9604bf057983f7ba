use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::crud::Document;
use crate::session::{cookie_value, set_cookie, Session, SessionOptions};

/// Server-side session store. The cookie carries only an opaque session id;
/// session data lives in an in-process map for the process lifetime.
#[derive(Debug)]
pub struct ServerSessions {
    options: SessionOptions,
    store: Mutex<HashMap<String, Document>>,
}

impl ServerSessions {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            store: Mutex::new(HashMap::new()),
        }
    }

    fn load(&self, id: &str) -> Option<Document> {
        match self.store.lock() {
            Ok(store) => store.get(id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(id).cloned(),
        }
    }

    fn save(&self, id: String, data: Document) {
        let mut store = match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        store.insert(id, data);
    }
}

pub async fn session_middleware(
    State(sessions): State<Arc<ServerSessions>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = cookie_value(request.headers(), &sessions.options.name)
        .and_then(|id| sessions.load(&id).map(|data| (id, data)));

    let (id, fresh, session) = match existing {
        Some((id, data)) => (id, false, Session::from_document(data)),
        None => (Uuid::new_v4().to_string(), true, Session::default()),
    };

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    sessions.save(id.clone(), session.snapshot());
    if fresh {
        set_cookie(response.headers_mut(), &sessions.options, &id);
    }
    response
}
