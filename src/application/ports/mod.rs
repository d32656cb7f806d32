//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod device_transport;
mod media_store;
mod session_store;
mod speech_synthesis;
mod text_expansion;
mod voice_cloning;

pub use device_transport::{DeviceTransportPort, TransportError};
pub use media_store::MediaStorePort;
pub use session_store::{SessionError, SessionStoreExt, SessionStorePort};
pub use speech_synthesis::{CharacterQuota, SpeechSynthesisPort, SynthesisError, SynthesisRequest};
pub use text_expansion::{ExpansionError, TextExpansionPort};
pub use voice_cloning::{CloneError, CloneRequest, VoiceCloningPort};
