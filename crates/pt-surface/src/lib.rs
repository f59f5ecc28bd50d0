//! External browsing surfaces: which installed application opens untrusted navigations, and
//! the requests handed to it.

pub mod color;
pub mod launch;
pub mod registry;
pub mod resolver;

pub use color::AccentColor;
pub use color::ColorParseError;
pub use launch::ExternalLauncher;
pub use launch::LaunchError;
pub use launch::OpenIntent;
pub use launch::SurfaceConfig;
pub use launch::TrustedSurfaceRequest;
pub use registry::ApplicationId;
pub use registry::HandlerRegistry;
pub use registry::InstalledHandler;
pub use registry::NoopHandlerRegistry;
pub use registry::RegistryError;
pub use registry::StaticHandlerRegistry;
pub use resolver::CachedSurfaceResolver;
pub use resolver::ExternalSurfaceResolver;
pub use resolver::HandlerSnapshot;
pub use resolver::LOCAL_CHANNEL_ID;
pub use resolver::STABLE_CHANNEL_ID;
pub use resolver::Selection;
pub use resolver::select_trusted_surface;
