mod zip;

pub use zip::ZipPackage;
