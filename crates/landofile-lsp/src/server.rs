//! LSP server implementation using tower-lsp.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{info, warn};

use landofile_lsp_core::{DocumentStore, EngineConfig, EngineContext, QueryFacade};

use crate::capabilities::server_capabilities;
use crate::convert;
use crate::options::InitializationOptions;
use crate::schema_file::FileSchemaSource;

/// The Landofile language server.
pub struct LandofileLanguageServer {
    /// The LSP client for sending notifications.
    client: Client,
    /// Document store for managing open documents.
    documents: Arc<RwLock<DocumentStore>>,
    /// Completion, hover and validation engine.
    engine: Arc<RwLock<QueryFacade>>,
    /// Schema file given on the command line; wins over the client's.
    schema_path: Option<PathBuf>,
}

impl LandofileLanguageServer {
    /// Create a new language server instance.
    pub fn new(client: Client, schema_path: Option<PathBuf>) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(DocumentStore::new())),
            engine: Arc::new(RwLock::new(QueryFacade::default())),
            schema_path,
        }
    }

    /// Apply client options and load the schema.
    async fn configure(&self, options: InitializationOptions) {
        let (facade, problems) = build_engine(options, self.schema_path.clone());
        *self.engine.write().await = facade;

        for problem in problems {
            self.client.show_message(MessageType::WARNING, problem).await;
        }
    }

    /// Publish diagnostics for a document.
    async fn publish_diagnostics(&self, uri: Url) {
        let documents = self.documents.read().await;

        if let Some(doc) = documents.get(uri.as_str()) {
            let engine = self.engine.read().await;
            let diagnostics: Vec<Diagnostic> = engine
                .validate(doc)
                .iter()
                .map(convert::diagnostic_to_lsp)
                .collect();
            let version = doc.version();
            drop(engine);
            drop(documents);

            self.client
                .publish_diagnostics(uri, diagnostics, version)
                .await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for LandofileLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let options = match InitializationOptions::from_value(params.initialization_options) {
            Ok(options) => options,
            Err(error) => {
                warn!(%error, "Malformed initializationOptions");
                InitializationOptions::default()
            }
        };
        self.configure(options).await;

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "landofile-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!("Landofile language server initialized");
        self.client
            .log_message(MessageType::INFO, "Landofile language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Landofile language server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let text = params.text_document.text;
        let version = params.text_document.version;

        {
            let mut documents = self.documents.write().await;
            documents.open(uri.as_str(), text, version);
        }

        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let version = params.text_document.version;

        // We're using full document sync, so take the last change
        if let Some(change) = params.content_changes.into_iter().last() {
            {
                let mut documents = self.documents.write().await;
                documents.change(uri.as_str(), change.text, version);
            }

            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        {
            let mut documents = self.documents.write().await;
            documents.close(uri.as_str());
        }

        // Clear diagnostics for closed document
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let documents = self.documents.read().await;
        let Some(doc) = documents.get(position.text_document.uri.as_str()) else {
            return Ok(None);
        };

        let engine = self.engine.read().await;
        let hover = engine.hover_at(doc, convert::position_from_lsp(&position.position), None);
        Ok(hover.as_ref().map(convert::hover_to_lsp))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let documents = self.documents.read().await;
        let Some(doc) = documents.get(position.text_document.uri.as_str()) else {
            return Ok(None);
        };

        let engine = self.engine.read().await;
        let items: Vec<CompletionItem> = engine
            .completions_at(doc, convert::position_from_lsp(&position.position))
            .iter()
            .map(convert::completion_item_to_lsp)
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }
}

/// Build a fresh engine from client options.
///
/// A schema path given on the command line wins over `schemaPath`. Returns
/// the engine together with user-facing warnings; neither a bad option nor
/// a missing schema stops the server.
pub(crate) fn build_engine(
    options: InitializationOptions,
    cli_schema: Option<PathBuf>,
) -> (QueryFacade, Vec<String>) {
    let mut problems = Vec::new();
    let config = match EngineConfig::from_json(options.engine) {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "Ignoring engine options");
            problems.push(format!("Ignoring engine options: {error}"));
            EngineConfig::default()
        }
    };

    let mut facade = QueryFacade::new(EngineContext::new(config));
    let Some(path) = cli_schema.or(options.schema_path) else {
        info!("No Landofile schema configured; only syntax checks and lints will run");
        return (facade, problems);
    };
    if let Err(error) = facade.load_from(&FileSchemaSource::new(path)) {
        warn!(%error, "Landofile schema not loaded");
        problems.push(error.to_string());
    }
    (facade, problems)
}

/// Run the LSP server over stdio.
pub async fn run_server(schema_path: Option<PathBuf>) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(move |client| LandofileLanguageServer::new(client, schema_path.clone()));
    Server::new(stdin, stdout, socket).serve(service).await;
}
