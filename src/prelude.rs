pub use crate::data_structs::typedef::*;
pub use crate::data_structs::{
    Channel,
    ChannelValue,
    Cohort,
    DmRegion,
    GeneAnnotation,
    GeneRecord,
    GeneRelation,
    GeneTable,
    GenomeWindow,
    MethylationRecord,
    Polarity,
    SampleMeta,
    SampleSeries,
    Strand,
};
pub use crate::error::{
    DhunterError,
    Result,
};
pub use crate::io::coverage::StrandMode;
pub use crate::tools::config::{
    BackendKind,
    ChannelSettings,
    DhunterConfig,
    SampleMode,
};
pub use crate::tools::dmr::{
    DmrConfig,
    DmrDetector,
};
pub use crate::tools::dwt::{
    CoefficientMatrix,
    CpuBackend,
    ParallelCpuBackend,
    TransformBackend,
    WaveletEngine,
};
pub use crate::tools::events::PipelineEvent;
pub use crate::tools::ingest::AbortHandle;
pub use crate::tools::matrix::PositionMatrix;
pub use crate::tools::pipeline::{
    DmrPipeline,
    RunSummary,
};
