use std::sync::Arc;

use crate::adapters::{AppConfig, FfmpegProbeAdapter, TomlConfigAdapter};
use crate::app::{encode_interactor::EncodeInteractor, inspect_interactor::InspectInteractor};
use crate::domain::catalog::PresetCatalog;
use crate::domain::errors::DomainError;
use crate::engine::FfmpegTextParser;
use crate::ports::{DiagnosticParser, PresetProvider, ProbePort};

pub trait AppContainer: Send + Sync {
    fn encode_interactor(&self) -> Arc<EncodeInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn preset_provider(&self) -> Arc<dyn PresetProvider>;
}

pub struct DefaultAppContainer {
    config_adapter: Arc<TomlConfigAdapter>,
    encode_interactor: Arc<EncodeInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let engine = config.engine_config();
        let parser: Arc<dyn DiagnosticParser> = Arc::new(FfmpegTextParser::new()?);
        let config_adapter = Arc::new(TomlConfigAdapter::new(config)?);
        let probe_port = Arc::new(FfmpegProbeAdapter::new(engine.clone(), Arc::clone(&parser)));

        let encode_interactor = Arc::new(EncodeInteractor::new(
            engine,
            Arc::clone(&probe_port) as Arc<dyn ProbePort>,
            Arc::clone(&config_adapter) as Arc<dyn PresetProvider>,
            parser,
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&probe_port) as Arc<dyn ProbePort>,
        ));

        Ok(Self {
            config_adapter,
            encode_interactor,
            inspect_interactor,
        })
    }

    pub fn config(&self) -> &AppConfig {
        self.config_adapter.config()
    }

    pub fn catalog(&self) -> &PresetCatalog {
        self.config_adapter.catalog()
    }
}

impl AppContainer for DefaultAppContainer {
    fn encode_interactor(&self) -> Arc<EncodeInteractor> {
        Arc::clone(&self.encode_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn preset_provider(&self) -> Arc<dyn PresetProvider> {
        Arc::clone(&self.config_adapter) as Arc<dyn PresetProvider>
    }
}
