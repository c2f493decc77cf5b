//! Host bridge: dispatches host requests against one page.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pagefill_config::BrowserConfig;
use pagefill_core::AutofillOrchestrator;
use pagefill_protocols::{
    AutofillEvent, CredentialStore, HostNotification, HostRequest, HostResponse, Page,
    PageInfoResponse, TextGenerator,
};

use crate::error::BridgeError;
use crate::page::CdpPage;

const NOTIFICATION_CAPACITY: usize = 256;

/// Whether the autofill pipeline may run on a page at `url`.
pub fn is_supported_url(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|url| matches!(url.scheme(), "http" | "https" | "file"))
}

/// Connects host requests to the autofill core of a single page.
///
/// At most one request runs at a time; a request arriving while another is in
/// flight is rejected with [`BridgeError::PassInProgress`]. Every outcome is
/// also surfaced as a `showAlert` notification.
pub struct HostBridge {
    page: Arc<dyn Page>,
    store: Arc<dyn CredentialStore>,
    orchestrator: Mutex<AutofillOrchestrator>,
    busy: AtomicBool,
    notifications: broadcast::Sender<HostNotification>,
}

impl HostBridge {
    /// Must be called inside a tokio runtime.
    pub fn new(
        page: Arc<dyn Page>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let orchestrator = AutofillOrchestrator::new(page.clone(), generator);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        tokio::spawn(forward_events(
            orchestrator.subscribe(),
            notifications.clone(),
        ));
        Self {
            page,
            store,
            orchestrator: Mutex::new(orchestrator),
            busy: AtomicBool::new(false),
            notifications,
        }
    }

    /// Attach to a browser tab over CDP.
    pub async fn attach(
        browser: &BrowserConfig,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, BridgeError> {
        let page = CdpPage::attach(&browser.endpoint, browser.target.as_deref()).await?;
        Ok(Self::new(Arc::new(page), generator, store))
    }

    /// Receive `showAlert` notifications of subsequent requests.
    pub fn subscribe(&self) -> broadcast::Receiver<HostNotification> {
        self.notifications.subscribe()
    }

    /// Whether a request is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Handle one host request. `cancel` stops an autofill pass before its
    /// next field.
    pub async fn handle(
        &self,
        request: HostRequest,
        cancel: &CancellationToken,
    ) -> Result<HostResponse, BridgeError> {
        let result = self.dispatch(request, cancel).await;
        if let Err(e) = &result {
            error!("Host request failed: {}", e);
            self.alert(e.to_string());
        }
        result
    }

    async fn dispatch(
        &self,
        request: HostRequest,
        cancel: &CancellationToken,
    ) -> Result<HostResponse, BridgeError> {
        self.check_page()?;
        let _busy = BusyGuard::acquire(&self.busy).ok_or(BridgeError::PassInProgress)?;

        match request {
            HostRequest::GetPageInfo => {
                let mut orchestrator = self.orchestrator.lock().await;
                let info = PageInfoResponse::from_snapshot(orchestrator.refresh_snapshot().await?);
                info!("Page has {} fillable fields", info.input_count);
                self.alert(info.status_message());
                Ok(HostResponse::PageInfo(info))
            }
            HostRequest::Autofill { api_key } => {
                let credential = self.credential(&api_key).await?;
                let mut orchestrator = self.orchestrator.lock().await;
                let summary = orchestrator.run(&credential, cancel).await?;
                Ok(HostResponse::Autofill(summary))
            }
        }
    }

    fn check_page(&self) -> Result<(), BridgeError> {
        match self.page.url() {
            Some(url) if !is_supported_url(&url) => Err(BridgeError::UnsupportedPage(url)),
            _ => Ok(()),
        }
    }

    /// The credential sent with the request, else the stored one.
    async fn credential(&self, provided: &str) -> Result<String, BridgeError> {
        let provided = provided.trim();
        if !provided.is_empty() {
            return Ok(provided.to_string());
        }
        debug!("No credential in request, reading storage");
        self.store
            .credential()
            .await?
            .map(|credential| credential.trim().to_string())
            .ok_or(BridgeError::MissingCredential)
    }

    fn alert(&self, message: String) {
        let _ = self
            .notifications
            .send(HostNotification::ShowAlert { message });
    }
}

/// Holds the busy flag for the duration of one request.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Relay pass events to the host as alerts. Ends once the orchestrator is
/// dropped and every buffered event has been relayed.
async fn forward_events(
    mut events: broadcast::Receiver<AutofillEvent>,
    notifications: broadcast::Sender<HostNotification>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("Autofill event: {}", event.message());
                let _ = notifications.send(event.to_alert());
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Dropped {} autofill notifications", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
