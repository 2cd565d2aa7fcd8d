// tgrun-core/tests/discovery_tests.rs

use std::fs::{self, File};
use std::path::PathBuf;
use tempfile::tempdir;
use tgrun_core::discovery::{default_bundle_dirs, find_bundled_tool_dir};

#[test]
fn test_prefers_named_subdirectory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let base = dir.path().to_path_buf();

    fs::create_dir(base.join("ffmpeg"))?;
    fs::create_dir(base.join("ffmpeg_bin"))?;
    File::create(base.join("ffmpeg").join("ffmpeg"))?;
    File::create(base.join("ffmpeg_bin").join("ffmpeg.exe"))?;
    File::create(base.join("ffmpeg.exe"))?;

    let found = find_bundled_tool_dir(&[base.clone()], "ffmpeg");
    assert_eq!(found, Some(base.join("ffmpeg")));
    Ok(())
}

#[test]
fn test_falls_back_to_bin_dir_then_base() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let base = dir.path().to_path_buf();

    // A directory named like the tool but without the binary is skipped.
    fs::create_dir(base.join("ffmpeg"))?;
    fs::create_dir(base.join("ffmpeg_bin"))?;
    File::create(base.join("ffmpeg_bin").join("ffmpeg.exe"))?;
    assert_eq!(
        find_bundled_tool_dir(&[base.clone()], "ffmpeg"),
        Some(base.join("ffmpeg_bin"))
    );

    fs::remove_file(base.join("ffmpeg_bin").join("ffmpeg.exe"))?;
    File::create(base.join("ffmpeg.exe"))?;
    assert_eq!(find_bundled_tool_dir(&[base.clone()], "ffmpeg"), Some(base));
    Ok(())
}

#[test]
fn test_searches_base_dirs_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let first = tempdir()?;
    let second = tempdir()?;
    File::create(second.path().join("ffmpeg"))?;

    let bases = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    assert_eq!(
        find_bundled_tool_dir(&bases, "ffmpeg"),
        Some(second.path().to_path_buf())
    );
    Ok(())
}

#[test]
fn test_nothing_bundled() {
    let missing = PathBuf::from("surely_this_does_not_exist_42_integration");
    assert_eq!(find_bundled_tool_dir(&[missing], "ffmpeg"), None);
    assert_eq!(find_bundled_tool_dir(&[], "ffmpeg"), None);
}

#[test]
fn test_default_bundle_dirs_is_the_executable_dir() {
    let dirs = default_bundle_dirs();
    let exe = std::env::current_exe().unwrap();
    assert_eq!(dirs, vec![exe.parent().unwrap().to_path_buf()]);
}
