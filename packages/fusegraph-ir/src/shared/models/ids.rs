//! Arena handles for fusion nodes
//!
//! Every graph structure in the crate keys on these handles instead of
//! references, so nothing borrows the owning `Fusion`.

crate::define_id!(
    /// Handle of an iteration domain
    IterDomainId,
    "id"
);

crate::define_id!(
    /// Handle of a tensor view
    TensorViewId,
    "T"
);

crate::define_id!(
    /// Handle of a tensor operation
    ExprId,
    "expr"
);

crate::define_id!(
    /// Handle of a split/merge transform between iteration domains
    TransformId,
    "xf"
);
