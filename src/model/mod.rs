pub(crate) mod document;
pub(crate) mod layer;
pub(crate) mod mask;
