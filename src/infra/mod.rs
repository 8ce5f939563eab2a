mod component_factory_impl;
mod docker_archive_image;
mod file_logger;
mod in_memory_image;

pub use component_factory_impl::ConcreteComponentFactory;
pub use docker_archive_image::{DockerArchiveImage, DockerArchiveLayer};
pub use file_logger::FileLogger;
pub use in_memory_image::{InMemoryImage, InMemoryImageBuilder, InMemoryLayer};
