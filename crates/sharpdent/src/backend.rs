//
// backend.rs
//
// The language server: document synchronization, configuration, and the
// indentation requests.
//

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::handlers::{self, IndentationParams, IndentationResult, INDENTATION_METHOD};
use crate::indentation::on_type_formatting_capability;
use crate::state::{RequestTracker, WorldState};

pub struct Backend {
    client: Client,
    state: Arc<RwLock<WorldState>>,
    requests: RequestTracker,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorldState::default())),
            requests: RequestTracker::default(),
        }
    }

    /// Handles `sharpdent/indentation`: the raw decision for one line.
    async fn indentation(&self, params: IndentationParams) -> Result<Option<IndentationResult>> {
        let uri = params.text_document.uri.clone();
        let (tree, settings) = {
            let state = self.state.read().await;
            (state.tree(&uri), state.settings.clone())
        };
        let Some(tree) = tree else {
            log::debug!("Indentation requested for unknown document {}", uri);
            return Ok(None);
        };

        let request = self.requests.begin(&uri);
        let token = request.token.clone();
        let result = tokio::task::spawn_blocking(move || {
            handlers::indentation(&tree, &settings, &params, &token)
        })
        .await;
        self.requests.finish(&uri, &request);

        match result {
            Ok(Ok(result)) => Ok(Some(result)),
            Ok(Err(e)) => {
                log::debug!("No indentation for {}: {}", uri, e);
                Ok(None)
            }
            Err(e) => {
                log::warn!("Indentation task failed: {}", e);
                Ok(None)
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("Initializing sharpdent");

        if let Some(client) = &params.client_info {
            log::info!(
                "Client: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }
        if let Some(options) = &params.initialization_options {
            let mut state = self.state.write().await;
            state.settings.apply_json(options);
            log::info!("Initial settings: {:?}", state.settings);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                document_on_type_formatting_provider: Some(on_type_formatting_capability()),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("sharpdent"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("sharpdent initialized");
        self.client
            .log_message(MessageType::INFO, "sharpdent ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("sharpdent shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        log::trace!("Opened {} (version {})", doc.uri, doc.version);
        let mut state = self.state.write().await;
        state.open_document(doc.uri, &doc.text, Some(doc.version));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Any pending answer is for a stale snapshot
        self.requests.cancel(&uri);

        let mut state = self.state.write().await;
        for change in params.content_changes {
            state.apply_change(&uri, change);
        }
        if let Some(doc) = state.documents.get_mut(&uri) {
            doc.version = Some(params.text_document.version);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.requests.cancel(&uri);
        self.state.write().await.close_document(&uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        log::trace!("Configuration changed");
        let mut state = self.state.write().await;
        let symbols_changed = state.settings.apply_json(&params.settings);
        if symbols_changed {
            state.reparse_all();
        }
    }

    async fn on_type_formatting(
        &self,
        params: DocumentOnTypeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document_position.text_document.uri.clone();
        let (tree, settings) = {
            let state = self.state.read().await;
            (state.tree(&uri), state.settings.clone())
        };
        let Some(tree) = tree else {
            log::debug!("Formatting requested for unknown document {}", uri);
            return Ok(None);
        };

        let request = self.requests.begin(&uri);
        let token = request.token.clone();
        let edits = tokio::task::spawn_blocking(move || {
            handlers::on_type_formatting(&tree, &settings, &params, &token)
        })
        .await;
        self.requests.finish(&uri, &request);

        match edits {
            Ok(edits) => Ok(edits),
            Err(e) => {
                log::warn!("Formatting task failed: {}", e);
                Ok(None)
            }
        }
    }
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(INDENTATION_METHOD, Backend::indentation)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("file:///Program.cs").unwrap()
    }

    async fn open(backend: &Backend, text: &str) {
        backend
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri(),
                    language_id: "csharp".to_string(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
    }

    fn on_type(line: u32, ch: &str) -> DocumentOnTypeFormattingParams {
        DocumentOnTypeFormattingParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri() },
                position: Position { line, character: 0 },
            },
            ch: ch.to_string(),
            options: FormattingOptions {
                tab_size: 4,
                insert_spaces: true,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_initialize_advertises_on_type_formatting() {
        let (service, _socket) = LspService::new(Backend::new);
        let result = service
            .inner()
            .initialize(InitializeParams {
                initialization_options: Some(serde_json::json!({ "indentSize": 2 })),
                ..Default::default()
            })
            .await
            .unwrap();
        let provider = result.capabilities.document_on_type_formatting_provider.unwrap();
        assert_eq!(provider.first_trigger_character, "\n");
        assert_eq!(service.inner().state.read().await.settings.indent_size, Some(2));
    }

    #[tokio::test]
    async fn test_edit_then_format() {
        let (service, _socket) = LspService::new(Backend::new);
        let backend = service.inner();
        open(backend, "class C\n{\n}").await;

        backend
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri(),
                    version: 2,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: Some(Range::new(Position::new(1, 1), Position::new(1, 1))),
                    range_length: None,
                    text: "\n".to_string(),
                }],
            })
            .await;

        let edits = backend.on_type_formatting(on_type(2, "\n")).await.unwrap().unwrap();
        assert_eq!(edits[0].new_text, "    ");
        assert_eq!(backend.state.read().await.documents[&uri()].version, Some(2));
    }

    #[tokio::test]
    async fn test_unknown_document_has_no_edits() {
        let (service, _socket) = LspService::new(Backend::new);
        let edits = service.inner().on_type_formatting(on_type(0, "\n")).await.unwrap();
        assert_eq!(edits, None);
    }

    #[tokio::test]
    async fn test_configuration_symbols_reparse() {
        let (service, _socket) = LspService::new(Backend::new);
        let backend = service.inner();
        open(backend, "#if DEBUG\nclass C\n{\n#endif\n").await;

        backend
            .did_change_configuration(DidChangeConfigurationParams {
                settings: serde_json::json!({ "sharpdent": { "preprocessorSymbols": ["DEBUG"] } }),
            })
            .await;
        let state = backend.state.read().await;
        assert_eq!(state.documents[&uri()].revision, 1);
        assert_eq!(state.settings.preprocessor_symbols, vec!["DEBUG"]);
    }

    #[tokio::test]
    async fn test_indentation_method() {
        let (service, _socket) = LspService::new(Backend::new);
        let backend = service.inner();
        open(backend, "class C\n{\n\n}").await;

        let result = backend
            .indentation(IndentationParams {
                text_document: TextDocumentIdentifier { uri: uri() },
                line: 2,
                base_indentation: None,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.decision, "follow");
        assert_eq!(result.column, Some(4));
    }

    #[tokio::test]
    async fn test_close_forgets_document() {
        let (service, _socket) = LspService::new(Backend::new);
        let backend = service.inner();
        open(backend, "class C { }").await;
        backend
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: uri() },
            })
            .await;
        assert!(backend.state.read().await.documents.is_empty());
    }
}
