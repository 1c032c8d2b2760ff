pub mod customers;
pub mod fragments;
pub mod policy;
pub mod records;

pub use customers::{CustomerClass, EntityId, ParseClassError};
pub use fragments::{
    FragmentSummary, LiveEntry, LiveFragment, PeriodicEntry, PeriodicFragment,
    StaticEntry, StaticFragment, Tier, TierFragment,
};
pub use policy::{GoalsPolicy, PolicyError};
pub use records::{
    ClassifiedRecord, DerivedRecord, MergedRecord, ParseOrderError, RankOrder,
    RankedRecord, RankingResult, Status, StatusCounts, Totals,
};
