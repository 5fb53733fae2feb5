use thiserror::Error;

/// Fatal batch errors. Per-record problems (malformed locators,
/// unparseable fields, arcs without a resolvable center) are skipped
/// and logged, they never abort a batch.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// The input link set is empty: there is nothing to baseline or
    /// correlate, and no partial output is produced.
    #[error("empty link set")]
    EmptyLinkSet,

    /// No raw arc record survived reconstruction. Matching is
    /// impossible without at least one arc carrying a center.
    #[error("no usable arcs in calibration input")]
    NoUsableArcs,

    /// The arc calibration carried no raw records at all, which
    /// points at missing or unparseable calibration metadata upstream.
    #[error("missing arc calibration records")]
    MissingArcRecords,
}
