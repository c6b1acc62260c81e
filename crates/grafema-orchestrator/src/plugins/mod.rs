//! Built-in phase plugins wired over `grafema-core` and
//! `grafema-analysis` (§4.5). These are the reference pipeline; a
//! config-driven deployment can register additional or alternative
//! plugins through the same [`crate::plugin::Plugin`] trait (§9 Plugin
//! dispatch: registry mapping plugin name to constructor).

pub mod analysis;
pub mod discovery;
pub mod enrichment;
pub mod indexing;
pub mod validation;

pub use analysis::WalkerAnalysisPlugin;
pub use discovery::WorkspaceDiscoveryPlugin;
pub use enrichment::SecurityCategoryEnrichmentPlugin;
pub use indexing::ModuleIndexingPlugin;
pub use validation::{DisconnectedNodeValidationPlugin, UnresolvedCallValidationPlugin};
