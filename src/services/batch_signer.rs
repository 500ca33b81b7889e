use std::sync::Arc;

use crossbeam_channel::unbounded;
use tracing::{debug, info};

use crate::error::{Result, SignatureError};
use crate::models::payment::{PaymentRequest, SignedPayload};
use crate::services::signature_service::PaymentSignatureService;

#[derive(Clone)]
pub struct BatchSigner {
    service: Arc<PaymentSignatureService>,
    workers: usize,
}

impl BatchSigner {
    pub fn new(service: Arc<PaymentSignatureService>) -> Self {
        Self::with_workers(service, num_cpus::get())
    }

    pub fn with_workers(service: Arc<PaymentSignatureService>, workers: usize) -> Self {
        Self {
            service,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn sign_all(&self, requests: Vec<PaymentRequest>) -> Result<Vec<Result<SignedPayload>>> {
        let total = requests.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        let workers = self.workers.min(total);

        let (job_tx, job_rx) = unbounded::<(usize, PaymentRequest)>();
        let (done_tx, done_rx) = unbounded::<(usize, Result<SignedPayload>)>();
        for job in requests.into_iter().enumerate() {
            // receiver is alive until the scope below ends
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        crossbeam::thread::scope(|s| {
            for worker in 0..workers {
                let jobs = job_rx.clone();
                let done = done_tx.clone();
                let service = &self.service;
                s.spawn(move |_| {
                    let mut signed = 0usize;
                    for (index, request) in jobs.iter() {
                        let _ = done.send((index, service.sign(&request)));
                        signed += 1;
                    }
                    debug!(worker, signed, "Batch worker finished");
                });
            }
        })
        .map_err(|_| SignatureError::WorkerPanicked)?;
        drop(done_tx);

        // Reordena pelo índice original
        let mut slots: Vec<Option<Result<SignedPayload>>> = (0..total).map(|_| None).collect();
        for (index, result) in done_rx.try_iter() {
            slots[index] = Some(result);
        }

        let results = slots
            .into_iter()
            .map(|slot| slot.ok_or(SignatureError::WorkerPanicked))
            .collect::<Result<Vec<_>>>()?;

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(total, failed, workers, "Batch signed");
        Ok(results)
    }
}
