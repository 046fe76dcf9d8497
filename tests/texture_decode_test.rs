#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn from_bytes_decodes_a_png_to_the_image_extent() {
    use shade_ngin::data_structures::texture::Texture;

    let (device, queue) = common::test_utils::mk_test_device();

    // Encode a small image in memory instead of shipping an asset file.
    let mut img = image::RgbaImage::new(3, 2);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgba([255, 0, 0, 255]);
    }
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encoding");

    let texture = Texture::from_bytes(&device, &queue, &bytes, "decoded", true).unwrap();
    assert_eq!(texture.texture.width(), 3);
    assert_eq!(texture.texture.height(), 2);
    assert_eq!(
        texture.texture.format(),
        wgpu::TextureFormat::Rgba8UnormSrgb
    );
    assert!(texture.sampler.is_some());
}

#[test]
#[cfg(feature = "integration-tests")]
fn from_bytes_rejects_garbage() {
    use shade_ngin::data_structures::texture::Texture;

    let (device, queue) = common::test_utils::mk_test_device();
    assert!(Texture::from_bytes(&device, &queue, &[0u8; 16], "garbage", true).is_err());
}

#[test]
#[cfg(feature = "integration-tests")]
fn from_rgba8_rejects_a_mismatched_pixel_buffer() {
    use shade_ngin::data_structures::texture::Texture;

    let (device, queue) = common::test_utils::mk_test_device();
    // 2x2 RGBA8 needs 16 bytes, not 8.
    let err = Texture::from_rgba8(&device, &queue, &[0u8; 8], (2, 2), None, false)
        .expect_err("size mismatch must be rejected");
    assert!(err.to_string().contains("2x2"));
}
