//! Voicerig - local voice-assistant pipeline bootstrapper
//!
//! This library provisions a Linux workstation for the voice pipeline and
//! launches its workloads:
//! - Credential caching (one sudo prompt, cached for later runs)
//! - OS package installation on first run
//! - Model asset downloads into the voice directory
//! - Launch mode selection (run what is local, or sparse-fetch it first)
//! - Four workload launches, each in its own terminal session
//!
//! # Flow
//!
//! ```text
//! credential ──► packages ──► privilege cache ──► assets
//!                                                    │
//!                              ┌─────────────────────▼──┐
//!                              │     launch selector     │
//!                              │ LocalReady │ NeedsFetch │
//!                              └─────┬───────────┬───────┘
//!                                    │     sparse checkout
//!                                    ▼           ▼
//!                       capture │ synthesis │ tts │ transcription
//! ```

pub mod bootstrap;
pub mod checkout;
pub mod config;
pub mod credential;
pub mod error;
pub mod launcher;
pub mod packages;
pub mod privilege;
pub mod provision;
pub mod selector;
pub mod workload;

pub use bootstrap::{Bootstrap, LaunchPlan, RigStatus};
pub use config::Config;
pub use credential::{CredentialSource, CredentialStore};
pub use error::{Error, Result};
pub use launcher::{Supervisor, WorkloadHandle, WorkloadStatus};
pub use packages::PackageInstaller;
pub use privilege::PrivilegeCache;
pub use provision::{AssetProvisioner, AssetSpec};
pub use selector::LaunchMode;
pub use workload::{Workload, WorkloadRole};
