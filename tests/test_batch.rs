mod common;

use captcha_letters::BatchExtractor;
use captcha_letters::batch::collect_images;
use common::*;

#[test]
fn test_collects_images_one_level_deep() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let set = dir.path().join("set1");
    std::fs::create_dir_all(&set)?;
    write_captcha(dir.path(), "TOP", &blob_image(10, 10, &[]));
    write_captcha(&set, "AB", &blob_image(10, 10, &[]));
    std::fs::write(set.join("notes.txt"), "not an image")?;

    let images = collect_images(dir.path())?;
    // entries sort by byte value, so "TOP.png" precedes "set1"
    assert_eq!(images, vec![dir.path().join("TOP.png"), set.join("AB.png")]);
    Ok(())
}

#[test]
fn test_batch_shares_counter_and_skips_failures() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let captchas = dir.path().join("captchas");
    let set = captchas.join("set1");
    std::fs::create_dir_all(&set)?;
    let output = dir.path().join("letters");

    let two_letters = blob_image(80, 40, &[(15, 10, 6, 20), (50, 10, 6, 20)]);
    write_captcha(&set, "AB", &two_letters);
    write_captcha(&set, "CA", &two_letters);
    std::fs::write(set.join("XY.png"), b"definitely not a png")?;

    let config = ExtractionConfig { passes_per_image: 2, ..ExtractionConfig::default() };
    let extractor = LetterExtractor::new(config);
    let counter = LabelCounter::new();
    let mut source = ScriptedDistortions::new([Distortion::None]);

    let summary = BatchExtractor::new(&extractor, &counter, &output).run(&captchas, &mut source)?;

    assert_eq!(summary.images, 3);
    assert_eq!(summary.runs, 6);
    assert_eq!(summary.failed_runs, 2);
    assert_eq!(summary.letters_saved, 8);

    // 'A' appears in both labels and both passes
    assert_eq!(counter.get("A"), 4);
    assert_eq!(counter.get("B"), 2);
    assert_eq!(counter.get("C"), 2);
    for n in 1..=4 {
        assert!(output.join("A").join(format!("{n}.png")).exists());
    }
    assert!(!output.join("X").exists());
    Ok(())
}
