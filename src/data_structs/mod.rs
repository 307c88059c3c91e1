//! Core data structures of the DMR pipeline.
//!
//! - [`MethylationRecord`] and [`SampleSeries`]: per-position read counts of
//!   one sample on one chromosome, with derived mC/hmC ratios.
//! - [`GenomeWindow`]: the position range observed on the current chromosome,
//!   which sizes every dense array.
//! - [`GeneRecord`] and [`GeneTable`]: the reference gene table used for
//!   annotation.
//! - [`DmRegion`]: a detected region with its optional gene annotation.
//! - Enumerations replacing positional flags: [`Channel`], [`Cohort`],
//!   [`Strand`], [`Polarity`].

mod enums;
mod gene;
mod record;
mod region;
pub mod typedef;
mod window;

pub use enums::{
    Channel,
    Cohort,
    Polarity,
    Strand,
};
pub use gene::{
    GeneRecord,
    GeneTable,
};
pub use record::{
    ChannelValue,
    MethylationRecord,
    SampleMeta,
    SampleSeries,
};
pub use region::{
    DmRegion,
    GeneAnnotation,
    GeneRelation,
};
pub use window::GenomeWindow;
