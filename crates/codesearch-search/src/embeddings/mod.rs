//! Embedding providers (§4.A): `LocalProvider`, `OpenAiProvider`, `AzureMlProvider`.

pub mod azure_ml;
pub mod local;
pub mod openai;
pub mod provider;

pub use azure_ml::{AzureMlConfig, AzureMlProvider};
pub use local::LocalProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{
    validate_dimension, EmbeddingProvider, EmbeddingProviderType, ProviderStatus,
};
