mod aggregation;
mod common;
mod routing;
