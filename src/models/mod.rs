pub mod approval;
pub mod group;
pub mod marker;
pub mod participant;
