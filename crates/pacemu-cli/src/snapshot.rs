use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use pacemu_core::video::Framebuffer;

pub fn write_png(path: &Path, fb: &Framebuffer) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        fb.width() as u32,
        fb.height() as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&fb.to_rgba_bytes())?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacemu_core::video::Rgba;
    use tempfile::tempdir;

    #[test]
    fn writes_a_decodable_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("frame.png");
        let mut fb = Framebuffer::new(4, 3);
        fb.clear(Rgba::opaque(0xFF, 0x00, 0x80));
        write_png(&path, &fb).unwrap();

        let decoder = png::Decoder::new(std::io::BufReader::new(File::open(&path).unwrap()));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size().unwrap()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(&buf[..4], &[0xFF, 0x00, 0x80, 0xFF]);
    }
}
