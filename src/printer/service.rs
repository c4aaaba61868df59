//! Print orchestration.
//!
//! [`PrintService`] assembles the adapter chain for each request from the
//! current configuration snapshot and runs it.

use std::sync::Arc;

use tracing::{info, warn};

use super::fallback::FallbackChain;
use super::state::{PrinterSettings, PrinterState};
use crate::discovery::diagnostics::ConfiguredIds;
use crate::discovery::{DeviceEnumerator, UsbDiagnostics, check_usb_accessibility};
use crate::error::{BridgeError, Result};
use crate::receipt::{self, ReceiptContent};
use crate::transport::{
    Adapter, DefaultHandleAdapter, ProtocolAdapter, SpoolerAdapter, SpoolerClient, UsbIdAdapter,
    UsbIdPrinter,
};

/// External collaborators the service shells out to.
#[derive(Clone)]
pub struct Backends {
    pub enumerator: Arc<dyn DeviceEnumerator>,
    pub spooler: Arc<dyn SpoolerClient>,
    pub usb_helper: Arc<dyn UsbIdPrinter>,
}

#[derive(Clone)]
pub struct PrintService {
    state: Arc<PrinterState>,
    backends: Backends,
}

impl PrintService {
    pub fn new(state: Arc<PrinterState>, backends: Backends) -> Self {
        Self { state, backends }
    }

    pub fn state(&self) -> &Arc<PrinterState> {
        &self.state
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    fn usb_adapter(&self, settings: &PrinterSettings) -> Option<Arc<dyn Adapter>> {
        settings.usb_ids().map(|(vendor, product)| {
            Arc::new(UsbIdAdapter::new(
                vendor,
                product,
                self.backends.usb_helper.clone(),
                self.backends.enumerator.clone(),
            )) as Arc<dyn Adapter>
        })
    }

    fn spooler_adapter(&self, printer_name: Option<String>) -> Arc<dyn Adapter> {
        Arc::new(SpoolerAdapter::new(self.backends.spooler.clone()).with_destination(printer_name))
    }

    /// Chain for plain text: USB IDs → device handle → spooler → TCP handle.
    pub fn plain_chain(
        &self,
        settings: &PrinterSettings,
        printer_name: Option<String>,
    ) -> FallbackChain {
        let mut chain = FallbackChain::new();

        if let Some(adapter) = self.usb_adapter(settings) {
            chain.push(adapter);
        }

        let device_handle = settings.device_handle();
        let has_device = device_handle.is_some();
        if let Some(handle) = device_handle {
            chain.push(Arc::new(ProtocolAdapter::new(handle)));
        }

        chain.push(self.spooler_adapter(printer_name));

        if !has_device {
            chain.push(Arc::new(DefaultHandleAdapter::new(self.state.clone())));
        }

        chain
    }

    /// Print plain text through the full fallback chain.
    pub async fn print_plain(&self, text: &str, printer_name: Option<String>) -> Result<String> {
        if text.is_empty() {
            return Err(BridgeError::InvalidInput("Text field is required".into()));
        }

        let settings = self.state.snapshot().await;
        let chain = self.plain_chain(&settings, printer_name);
        info!(adapters = ?chain.names(), "Printing text");

        chain
            .run(text, true)
            .await
            .map_err(|exhausted| BridgeError::ExhaustedFallback(exhausted.message()))
    }

    /// Print a receipt.
    ///
    /// The USB-ID helper and the spooler only take plain text, so they get the
    /// composed blob; the protocol handle gets the rich rendering.
    pub async fn print_formatted(&self, content: &ReceiptContent) -> Result<String> {
        if content.is_empty() {
            return Err(BridgeError::InvalidInput(
                "Receipt needs text, a title or items".into(),
            ));
        }

        let blob = receipt::compose_text(content);
        let settings = self.state.snapshot().await;

        if let Some(adapter) = self.usb_adapter(&settings) {
            match adapter.send(&blob, true).await {
                Ok(_) => return Ok("Receipt printed successfully via USB".to_string()),
                Err(e) => warn!(error = %e, "USB ID receipt print failed, trying alternatives"),
            }
        }

        if let Some(handle) = self.state.ensure_handle().await {
            let mut job = handle.job();
            receipt::render(&mut job, content);
            handle.execute(job).await?;
            return Ok("Receipt printed successfully".to_string());
        }

        let mut chain = FallbackChain::new();
        chain.push(self.spooler_adapter(None));
        chain
            .run(&blob, true)
            .await
            .map_err(|exhausted| BridgeError::ExhaustedFallback(exhausted.message()))
    }

    /// Send the self-test page: USB IDs when configured, otherwise the spooler.
    pub async fn print_test(&self) -> Result<String> {
        let text = receipt::self_test_text(&receipt::current_datetime());
        let settings = self.state.snapshot().await;

        let adapter = self
            .usb_adapter(&settings)
            .unwrap_or_else(|| self.spooler_adapter(None));

        match adapter.send(&text, true).await {
            Ok(_) => Ok("Test print sent successfully".to_string()),
            Err(e) => {
                warn!(adapter = adapter.name(), error = %e, "Test print failed");
                Err(e)
            }
        }
    }

    /// USB accessibility report for the current configuration.
    pub async fn diagnostics(&self) -> UsbDiagnostics {
        let settings = self.state.snapshot().await;
        let configured = ConfiguredIds {
            vendor_id: settings.usb_vendor_id,
            product_id: settings.usb_product_id,
        };
        check_usb_accessibility(self.backends.enumerator.as_ref(), configured).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::BusState;
    use crate::printer::REMEDIATION_HINT;
    use crate::protocol::EscPosBuilder;
    use crate::transport::usb_ids::{HelperOutput, HelperRequest};
    use crate::transport::{LinkFactory, PrinterLink};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::sync::Mutex;

    struct NoUsb;

    #[async_trait]
    impl DeviceEnumerator for NoUsb {
        async fn serial_candidates(&self) -> Vec<String> {
            Vec::new()
        }
        async fn usb_tool_available(&self) -> bool {
            true
        }
        async fn try_usb_listing(&self) -> std::result::Result<String, String> {
            Ok(String::new())
        }
        async fn usb_bus(&self) -> BusState {
            BusState::Missing
        }
    }

    #[derive(Default)]
    struct FakeSpooler {
        fail: bool,
        jobs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpoolerClient for FakeSpooler {
        async fn printers(&self) -> Vec<String> {
            vec!["EPSON_TM_T20".into()]
        }
        async fn default_destination(&self) -> Option<String> {
            None
        }
        async fn status_lines(&self) -> Vec<String> {
            Vec::new()
        }
        async fn submit(&self, _dest: Option<&str>, file: &Path) -> Result<()> {
            self.jobs
                .lock()
                .unwrap()
                .push(std::fs::read_to_string(file).unwrap());
            if self.fail {
                Err(BridgeError::Transport("lp: printer not responding".into()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct FakeHelper {
        fail: bool,
        texts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl UsbIdPrinter for FakeHelper {
        async fn run(&self, request: &HelperRequest) -> Result<HelperOutput> {
            self.texts.lock().unwrap().push(request.text.clone());
            let stdout = if self.fail {
                r#"{"success": false, "error": "Printer not found"}"#
            } else {
                r#"{"success": true, "message": "Print successful"}"#
            };
            Ok(HelperOutput {
                exit_ok: true,
                exit_code: Some(0),
                stdout: stdout.into(),
                stderr: String::new(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingLink {
        fail: bool,
        writes: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl PrinterLink for RecordingLink {
        fn endpoint(&self) -> String {
            "localhost:9100".into()
        }
        async fn write(&self, data: &[u8]) -> Result<()> {
            if self.fail {
                return Err(BridgeError::Transport("Connection timeout: localhost:9100".into()));
            }
            self.writes.lock().unwrap().push(data.to_vec());
            Ok(())
        }
    }

    struct FixedLinks(Arc<RecordingLink>);

    impl LinkFactory for FixedLinks {
        fn device(&self, _path: &Path) -> Result<Arc<dyn PrinterLink>> {
            Ok(self.0.clone())
        }
        fn network(&self, _addr: &str) -> Result<Arc<dyn PrinterLink>> {
            Ok(self.0.clone())
        }
    }

    /// Nothing to connect to: every link fails to build.
    struct NoLinks;

    impl LinkFactory for NoLinks {
        fn device(&self, path: &Path) -> Result<Arc<dyn PrinterLink>> {
            Err(BridgeError::Transport(format!("cannot open {}", path.display())))
        }
        fn network(&self, addr: &str) -> Result<Arc<dyn PrinterLink>> {
            Err(BridgeError::InvalidInput(format!("Invalid printer address: {}", addr)))
        }
    }

    struct Fixture {
        service: PrintService,
        spooler: Arc<FakeSpooler>,
        helper: Arc<FakeHelper>,
        link: Arc<RecordingLink>,
    }

    fn fixture(spooler: FakeSpooler, helper: FakeHelper, link: RecordingLink) -> Fixture {
        let link = Arc::new(link);
        fixture_with_links(spooler, helper, link.clone(), Arc::new(FixedLinks(link)))
    }

    fn fixture_with_links(
        spooler: FakeSpooler,
        helper: FakeHelper,
        link: Arc<RecordingLink>,
        links: Arc<dyn LinkFactory>,
    ) -> Fixture {
        let spooler = Arc::new(spooler);
        let helper = Arc::new(helper);
        let state = Arc::new(PrinterState::new(links, "localhost:9100"));
        let service = PrintService::new(
            state,
            Backends {
                enumerator: Arc::new(NoUsb),
                spooler: spooler.clone(),
                usb_helper: helper.clone(),
            },
        );
        Fixture {
            service,
            spooler,
            helper,
            link,
        }
    }

    #[tokio::test]
    async fn test_usb_failure_falls_through_to_spooler() {
        let f = fixture(
            FakeSpooler::default(),
            FakeHelper {
                fail: true,
                ..Default::default()
            },
            RecordingLink::default(),
        );
        f.service.state().set_usb_ids("0x04b8", "0x0202").await.unwrap();

        let message = f.service.print_plain("hello", None).await.unwrap();

        assert_eq!(message, "Printed to EPSON_TM_T20");
        assert_eq!(f.helper.texts.lock().unwrap().len(), 1);
        assert_eq!(*f.spooler.jobs.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_chain_shape_follows_configuration() {
        let f = fixture(FakeSpooler::default(), FakeHelper::default(), RecordingLink::default());
        let settings = f.service.state().snapshot().await;
        assert_eq!(
            f.service.plain_chain(&settings, None).names(),
            vec!["System printer", "Thermal printer"]
        );

        let device = tempfile::NamedTempFile::new().unwrap();
        f.service.state().set_usb_ids("1208", "514").await.unwrap();
        f.service
            .state()
            .set_device_path(device.path().to_str().unwrap())
            .await
            .unwrap();
        let settings = f.service.state().snapshot().await;
        assert_eq!(
            f.service.plain_chain(&settings, None).names(),
            vec!["USB IDs", "USB device", "System printer"]
        );
    }

    #[tokio::test]
    async fn test_spooler_failure_uses_tcp_handle() {
        let f = fixture(
            FakeSpooler {
                fail: true,
                ..Default::default()
            },
            FakeHelper::default(),
            RecordingLink::default(),
        );

        let message = f.service.print_plain("hello", None).await.unwrap();

        assert_eq!(message, "Print job sent successfully");
        assert_eq!(f.link.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_everything_failing_reports_both_errors() {
        let f = fixture(
            FakeSpooler {
                fail: true,
                ..Default::default()
            },
            FakeHelper::default(),
            RecordingLink {
                fail: true,
                ..Default::default()
            },
        );

        let err = f.service.print_plain("hello", None).await.unwrap_err();

        assert!(matches!(err, BridgeError::ExhaustedFallback(_)));
        let message = err.to_string();
        assert!(message.contains("System printer: lp: printer not responding"));
        assert!(message.contains("Thermal printer: Connection timeout: localhost:9100"));
        assert!(message.contains("privileged mode"));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let f = fixture(FakeSpooler::default(), FakeHelper::default(), RecordingLink::default());
        let err = f.service.print_plain("", None).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(f.spooler.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_uses_usb_ids_with_composed_text() {
        let f = fixture(FakeSpooler::default(), FakeHelper::default(), RecordingLink::default());
        f.service.state().set_usb_ids("0x04b8", "0x0202").await.unwrap();
        let content = ReceiptContent::new(Some("A".into()), Some("B".into()), vec!["1".into()]);

        let message = f.service.print_formatted(&content).await.unwrap();

        assert_eq!(message, "Receipt printed successfully via USB");
        assert_eq!(
            f.helper.texts.lock().unwrap()[0],
            receipt::compose_text(&content)
        );
        assert!(f.link.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_renders_on_protocol_handle() {
        let f = fixture(FakeSpooler::default(), FakeHelper::default(), RecordingLink::default());
        let content = ReceiptContent::new(Some("A".into()), Some("B".into()), vec!["1".into()]);

        let message = f.service.print_formatted(&content).await.unwrap();

        assert_eq!(message, "Receipt printed successfully");
        let mut expected = EscPosBuilder::default();
        receipt::render(&mut expected, &content);
        assert_eq!(f.link.writes.lock().unwrap()[0], expected.build());
        assert!(f.spooler.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_handle_failure_is_surfaced() {
        let f = fixture(
            FakeSpooler::default(),
            FakeHelper::default(),
            RecordingLink {
                fail: true,
                ..Default::default()
            },
        );
        let content = ReceiptContent::new(None, Some("B".into()), Vec::new());

        let err = f.service.print_formatted(&content).await.unwrap_err();

        assert_eq!(err.to_string(), "Connection timeout: localhost:9100");
        assert!(!err.is_client_error());
        assert!(f.spooler.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_test_print_prefers_usb_ids() {
        let f = fixture(FakeSpooler::default(), FakeHelper::default(), RecordingLink::default());

        assert_eq!(f.service.print_test().await.unwrap(), "Test print sent successfully");
        assert_eq!(f.spooler.jobs.lock().unwrap().len(), 1);

        f.service.state().set_usb_ids("0x04b8", "0x0202").await.unwrap();
        f.service.print_test().await.unwrap();
        assert_eq!(f.helper.texts.lock().unwrap().len(), 1);
        assert_eq!(f.spooler.jobs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_without_handle_goes_to_spooler() {
        let f = fixture_with_links(
            FakeSpooler::default(),
            FakeHelper::default(),
            Arc::new(RecordingLink::default()),
            Arc::new(NoLinks),
        );
        let content = ReceiptContent::new(Some("A".into()), Some("B".into()), vec!["1".into()]);

        let message = f.service.print_formatted(&content).await.unwrap();

        assert_eq!(message, "Printed to EPSON_TM_T20");
        assert_eq!(
            *f.spooler.jobs.lock().unwrap(),
            vec![receipt::compose_text(&content)]
        );
    }

    #[tokio::test]
    async fn test_receipt_without_handle_and_failing_spooler_is_exhausted() {
        let f = fixture_with_links(
            FakeSpooler {
                fail: true,
                ..Default::default()
            },
            FakeHelper::default(),
            Arc::new(RecordingLink::default()),
            Arc::new(NoLinks),
        );
        let content = ReceiptContent::new(None, Some("B".into()), Vec::new());

        let err = f.service.print_formatted(&content).await.unwrap_err();

        assert!(matches!(err, BridgeError::ExhaustedFallback(_)));
        assert!(err.to_string().contains("System printer: lp: printer not responding"));
    }

    #[tokio::test]
    async fn test_plain_print_without_handle_reports_no_printer() {
        let f = fixture_with_links(
            FakeSpooler {
                fail: true,
                ..Default::default()
            },
            FakeHelper::default(),
            Arc::new(RecordingLink::default()),
            Arc::new(NoLinks),
        );

        let err = f.service.print_plain("hello", None).await.unwrap_err();

        assert!(matches!(err, BridgeError::ExhaustedFallback(_)));
        let message = err.to_string();
        assert!(message.contains("Thermal printer: No printer configured"));
        assert!(message.ends_with(REMEDIATION_HINT));
        assert!(f.link.writes.lock().unwrap().is_empty());
    }
}
