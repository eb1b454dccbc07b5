pub mod building;
pub mod call;
pub mod floor;

pub use building::Building;
pub use call::Call;
pub use floor::Floor;
