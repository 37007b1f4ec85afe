pub(crate) mod clone;
pub(crate) mod tarball;
