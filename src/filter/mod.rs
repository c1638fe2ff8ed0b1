//! Document inclusion/exclusion filtering

mod policy;

pub use policy::ExclusionPolicy;
