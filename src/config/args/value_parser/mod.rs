pub mod bucket_name;
pub mod file_exist;
pub mod url;
