use std::path::PathBuf;

use crossbeam::channel::Sender;
use log::trace;

use crate::data_structs::typedef::PosType;
use crate::data_structs::Channel;

/// Progress and result notifications for the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// One sample finished reading. Bounds are `None` for an empty series.
    FileRead {
        sample:     usize,
        chromosome: String,
        min_pos:    Option<PosType>,
        max_pos:    Option<PosType>,
    },
    /// A coverage file could not be opened.
    IngestionError {
        sample:  usize,
        path:    Option<PathBuf>,
        message: String,
    },
    /// All samples of the chromosome were read.
    ChromosomeRead {
        chromosome: String,
        n_samples:  usize,
    },
    GenesLoaded {
        chromosome: String,
        n_genes:    usize,
    },
    ChannelFinished {
        chromosome: String,
        channel:    Channel,
        dmr_count:  usize,
    },
    NoDmrsFound {
        chromosome: String,
        channel:    Channel,
    },
    /// Capacity or output failure; the channel pass was skipped.
    Failure {
        chromosome: String,
        channel:    Channel,
        message:    String,
    },
    ChromosomeFinished {
        chromosome: String,
    },
    Aborted {
        chromosome: String,
    },
}

/// Optional event sink. Sending never fails the pipeline.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<PipelineEvent>>,
}

impl EventSink {
    pub fn new(sender: Sender<PipelineEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn send(
        &self,
        event: PipelineEvent,
    ) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                trace!("Event receiver dropped");
            }
        }
    }
}
