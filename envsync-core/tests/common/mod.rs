#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use envsync_core::codec::Codec;
use envsync_core::crypto::kdf::KdfParams;
use envsync_core::util::timestamp::to_file_time;
use time::OffsetDateTime;

pub const PASSWORD: &str = "integration-password";

/// Low-cost KDF so tests do not spend 64 MiB per file.
pub fn cheap_codec() -> Codec {
    Codec::with_kdf(KdfParams::new(1024, 1, 1))
}

pub fn write_with_mtime(path: &Path, contents: &str, mtime: OffsetDateTime) -> PathBuf {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(path, contents).unwrap();
    let ft = to_file_time(mtime);
    filetime::set_file_times(path, ft, ft).unwrap();
    path.to_path_buf()
}

pub fn mtime_of(path: &Path) -> OffsetDateTime {
    OffsetDateTime::from(fs::metadata(path).unwrap().modified().unwrap())
}
