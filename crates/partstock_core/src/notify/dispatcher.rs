//! Queue handoff between the service and notifier workers.
//!
//! # Responsibility
//! - Turn committed-mutation events into queued notification requests.
//! - Run each request through snapshot, render and send on a worker thread.
//!
//! # Invariants
//! - Enqueueing never blocks and never fails the caller (unbounded channel).
//! - Workers exit once every `ChangeNotifier` clone has been dropped and the
//!   queue is drained.
//! - No ordering guarantee between deliveries of different requests.

use crate::notify::error::{DeliveryStage, NotificationError};
use crate::notify::export::{render_inventory_xlsx, XLSX_CONTENT_TYPE};
use crate::notify::snapshot::SnapshotSource;
use crate::notify::transport::{
    MessageAttachment, MessageSettings, NotificationTransport, OutboundMessage,
};
use crate::service::change_sink::{ChangeSink, MutationEvent, MutationKind};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

const WORKER_THREAD_PREFIX: &str = "partstock-notify";

/// Trigger token placed on the notifier queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Monotonic per-notifier sequence, for log correlation only.
    pub sequence: u64,
    pub kind: MutationKind,
    pub part_name: String,
}

/// Summary of one delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub sequence: u64,
    pub part_count: usize,
    pub attachment_bytes: usize,
}

/// Snapshot → render → send pipeline shared by all workers.
pub struct NotifierPipeline {
    source: Arc<dyn SnapshotSource>,
    transport: Arc<dyn NotificationTransport>,
    message: MessageSettings,
}

impl NotifierPipeline {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        transport: Arc<dyn NotificationTransport>,
        message: MessageSettings,
    ) -> Self {
        Self {
            source,
            transport,
            message,
        }
    }

    /// Runs one request to a terminal stage.
    ///
    /// The error names the stage that failed; there is no retry.
    pub fn deliver(
        &self,
        request: &NotificationRequest,
    ) -> Result<DeliveryReceipt, NotificationError> {
        trace_stage(request, DeliveryStage::Snapshotting);
        let parts = self.source.snapshot()?;

        trace_stage(request, DeliveryStage::Rendering);
        let bytes = render_inventory_xlsx(&parts)?;
        let attachment_bytes = bytes.len();
        let outbound = OutboundMessage {
            subject: self.message.subject.clone(),
            body: format!(
                "Inventory changed ({} `{}`). The attached sheet lists all {} parts.",
                request.kind,
                request.part_name,
                parts.len()
            ),
            attachment: MessageAttachment {
                filename: self.message.attachment_name.clone(),
                content_type: XLSX_CONTENT_TYPE.to_string(),
                bytes,
            },
        };

        trace_stage(request, DeliveryStage::Sending);
        self.transport.deliver(&outbound)?;

        Ok(DeliveryReceipt {
            sequence: request.sequence,
            part_count: parts.len(),
            attachment_bytes,
        })
    }
}

fn trace_stage(request: &NotificationRequest, stage: DeliveryStage) {
    debug!(
        "event=notify_stage module=notify seq={} stage={}",
        request.sequence,
        stage.as_str()
    );
}

/// Producer handle given to the inventory service.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: Sender<NotificationRequest>,
    next_sequence: Arc<AtomicU64>,
}

impl ChangeSink for ChangeNotifier {
    fn mutation_committed(&self, event: MutationEvent) {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let request = NotificationRequest {
            sequence,
            kind: event.kind,
            part_name: event.part_name,
        };
        match self.sender.send(request) {
            Ok(()) => debug!(
                "event=notify_stage module=notify seq={} stage={}",
                sequence,
                DeliveryStage::Triggered.as_str()
            ),
            Err(_) => warn!(
                "event=notify_enqueue module=notify status=error seq={} error_code=workers_stopped",
                sequence
            ),
        }
    }
}

/// Join handles of the running worker threads.
#[derive(Debug)]
pub struct NotifierWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl NotifierWorkers {
    /// Waits for all workers to finish the queue.
    ///
    /// Only returns once every `ChangeNotifier` clone is dropped.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                error!("event=notify_worker module=notify status=error error_code=worker_panicked");
            }
        }
    }
}

/// Starts `worker_count` named worker threads (at least one) over `pipeline`.
///
/// # Errors
/// - Returns the OS error when a worker thread cannot be spawned. Workers
///   spawned before the failure exit on their own.
pub fn start_notifier(
    pipeline: NotifierPipeline,
    worker_count: usize,
) -> std::io::Result<(ChangeNotifier, NotifierWorkers)> {
    let (sender, receiver) = unbounded::<NotificationRequest>();
    let pipeline = Arc::new(pipeline);
    let worker_count = worker_count.max(1);

    let mut handles = Vec::with_capacity(worker_count);
    for index in 0..worker_count {
        let receiver = receiver.clone();
        let pipeline = Arc::clone(&pipeline);
        let handle = std::thread::Builder::new()
            .name(format!("{WORKER_THREAD_PREFIX}-{index}"))
            .spawn(move || run_worker(&receiver, &pipeline))?;
        handles.push(handle);
    }

    info!(
        "event=notify_start module=notify status=ok workers={}",
        worker_count
    );
    Ok((
        ChangeNotifier {
            sender,
            next_sequence: Arc::new(AtomicU64::new(1)),
        },
        NotifierWorkers { handles },
    ))
}

fn run_worker(receiver: &Receiver<NotificationRequest>, pipeline: &NotifierPipeline) {
    while let Ok(request) = receiver.recv() {
        let started_at = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| pipeline.deliver(&request)));
        match result {
            Ok(Ok(receipt)) => info!(
                "event=notify_delivery module=notify status=ok seq={} stage={} kind={} parts={} bytes={} duration_ms={}",
                receipt.sequence,
                DeliveryStage::Delivered.as_str(),
                request.kind,
                receipt.part_count,
                receipt.attachment_bytes,
                started_at.elapsed().as_millis()
            ),
            Ok(Err(err)) => error!(
                "event=notify_delivery module=notify status=error seq={} stage={} failed_stage={} kind={} duration_ms={} error={}",
                request.sequence,
                DeliveryStage::Failed.as_str(),
                err.stage().as_str(),
                request.kind,
                started_at.elapsed().as_millis(),
                err
            ),
            Err(_) => error!(
                "event=notify_delivery module=notify status=error seq={} stage={} kind={} error_code=delivery_panicked",
                request.sequence,
                DeliveryStage::Failed.as_str(),
                request.kind
            ),
        }
    }
    debug!("event=notify_worker module=notify status=stopped");
}
