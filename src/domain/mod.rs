//! Inventory liquidity domain: products, pricing math, workflows.

pub mod entities;
pub mod inventory;
pub mod pricing;
pub mod workflow;

pub use entities::{Product, ProductStatus, Sku, Workflow};
pub use inventory::{BulkEdit, Inventory, MergeReport};
pub use pricing::{
    calculate_elasticity, calculate_liquidity_score, calculate_optimal_path,
    calculate_optimal_path_with, ElasticityResult, OptimalPath, PathOption, PathRates,
    RecoveryChannel,
};
pub use workflow::{WorkflowBook, WorkflowDraft, WorkflowError};
