pub(crate) mod blend;
pub(crate) mod compositor;
pub(crate) mod stage;
pub(crate) mod surface;
