//! Defaults describing a stock Flux installation.

/// Labels carried by the CRDs Flux installs.
pub const DEFAULT_LABEL_SELECTOR: &str = "app.kubernetes.io/part-of=flux";

/// Audit `methodName` of write operations on Flux resources.
pub const DEFAULT_METHOD_PATTERN: &str = r"io\.fluxcd\.toolkit\..*\.(patch|create)";

/// Flux's own controllers, whose writes are not user changes.
pub const DEFAULT_EXCLUDED_PRINCIPAL_PATTERN: &str =
    "^system:serviceaccount:flux-system:.*-controller$";
