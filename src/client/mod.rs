pub mod remote;
pub mod traits;

pub use remote::RemoteClient;
pub use traits::ListingSource;
