pub mod server;

use prometheus::{
    Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    // Chain
    head_epoch: IntGauge,
    finalized_epoch: IntGauge,
    // Export
    export_set_size: IntGauge,
    epochs_exported: IntCounterVec,
    epoch_export_failures: IntCounterVec,
    epoch_export_time: HistogramVec,
    partial_fetches: IntCounterVec,
    substituted_participation: IntCounterVec,
    equivocations: IntCounterVec,
    // Pools
    attestation_pool_size: IntGauge,
    validator_queue_size: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let head_epoch = IntGauge::with_opts(Opts::new(
            "exporter_head_epoch",
            "Head epoch reported by the node",
        ))?;
        registry.register(Box::new(head_epoch.clone()))?;

        let finalized_epoch = IntGauge::with_opts(Opts::new(
            "exporter_finalized_epoch",
            "Finalized epoch reported by the node",
        ))?;
        registry.register(Box::new(finalized_epoch.clone()))?;

        let export_set_size = IntGauge::with_opts(Opts::new(
            "exporter_export_set_size",
            "Number of epochs queued by the last reconciliation",
        ))?;
        registry.register(Box::new(export_set_size.clone()))?;

        let epochs_exported = IntCounterVec::new(
            Opts::new("exporter_epochs_exported_total", "Total number of exported epochs"),
            &["phase"],
        )?;
        registry.register(Box::new(epochs_exported.clone()))?;

        let epoch_export_failures = IntCounterVec::new(
            Opts::new(
                "exporter_epoch_export_failures_total",
                "Total number of failed epoch exports",
            ),
            &["phase"],
        )?;
        registry.register(Box::new(epoch_export_failures.clone()))?;

        let epoch_export_time = HistogramVec::new(
            HistogramOpts::new(
                "exporter_epoch_export_time_seconds",
                "Time taken to export one epoch",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &[],
        )?;
        registry.register(Box::new(epoch_export_time.clone()))?;

        let partial_fetches = IntCounterVec::new(
            Opts::new(
                "exporter_partial_fetches_total",
                "Paginated fetches that stopped early because of a node error",
            ),
            &["resource"],
        )?;
        registry.register(Box::new(partial_fetches.clone()))?;

        let substituted_participation = IntCounterVec::new(
            Opts::new(
                "exporter_substituted_participation_total",
                "Epochs stored with default participation because the node failed",
            ),
            &[],
        )?;
        registry.register(Box::new(substituted_participation.clone()))?;

        let equivocations = IntCounterVec::new(
            Opts::new(
                "exporter_equivocations_total",
                "Slots for which the node reported more than one block",
            ),
            &[],
        )?;
        registry.register(Box::new(equivocations.clone()))?;

        let attestation_pool_size = IntGauge::with_opts(Opts::new(
            "exporter_attestation_pool_size",
            "Attestations in the last pool snapshot",
        ))?;
        registry.register(Box::new(attestation_pool_size.clone()))?;

        let validator_queue_size = IntGaugeVec::new(
            Opts::new(
                "exporter_validator_queue_size",
                "Validators in the last queue snapshot",
            ),
            &["direction"],
        )?;
        registry.register(Box::new(validator_queue_size.clone()))?;

        Ok(Self {
            registry,
            head_epoch,
            finalized_epoch,
            export_set_size,
            epochs_exported,
            epoch_export_failures,
            epoch_export_time,
            partial_fetches,
            substituted_participation,
            equivocations,
            attestation_pool_size,
            validator_queue_size,
        })
    }

    pub fn gather(&self) -> prometheus::Result<String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::<u8>::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }

    // Chain
    pub fn set_chain_head(&self, head_epoch: u64, finalized_epoch: u64) {
        self.head_epoch.set(head_epoch as i64);
        self.finalized_epoch.set(finalized_epoch as i64);
    }

    // Export
    pub fn set_export_set_size(&self, v: usize) {
        self.export_set_size.set(v as i64);
    }

    pub fn inc_epochs_exported(&self, phase: &str) {
        self.epochs_exported.with_label_values(&[phase]).inc();
    }

    pub fn inc_epoch_export_failures(&self, phase: &str) {
        self.epoch_export_failures.with_label_values(&[phase]).inc();
    }

    pub fn start_epoch_export_timer(&self) -> HistogramTimer {
        self.epoch_export_time.with_label_values::<&str>(&[]).start_timer()
    }

    pub fn inc_partial_fetches(&self, resource: &str) {
        self.partial_fetches.with_label_values(&[resource]).inc();
    }

    pub fn inc_substituted_participation(&self) {
        self.substituted_participation.with_label_values::<&str>(&[]).inc();
    }

    pub fn inc_equivocations(&self) {
        self.equivocations.with_label_values::<&str>(&[]).inc();
    }

    // Pools
    pub fn set_attestation_pool_size(&self, v: usize) {
        self.attestation_pool_size.set(v as i64);
    }

    pub fn set_validator_queue_size(&self, activations: usize, exits: usize) {
        self.validator_queue_size
            .with_label_values(&["activation"])
            .set(activations as i64);
        self.validator_queue_size
            .with_label_values(&["exit"])
            .set(exits as i64);
    }
}
