use raylib::prelude::*;
use raylib::core::texture::RaylibTexture2D; // update_texture()

/// Packs a color as `0x00BBGGRR`. This is the only layout the buffer holds;
/// every write and every blend goes through `pack_rgb`/`unpack_rgb`.
#[inline]
pub const fn pack_rgb(c: Color) -> u32 {
    ((c.b as u32) << 16) | ((c.g as u32) << 8) | c.r as u32
}

#[inline]
pub const fn unpack_rgb(p: u32) -> Color {
    Color::new((p & 0xFF) as u8, ((p >> 8) & 0xFF) as u8, ((p >> 16) & 0xFF) as u8, 255)
}

/// Straight alpha: `src * a + dst * (1 - a)` per channel.
#[inline]
pub fn blend(src: Color, dst: Color) -> Color {
    let a = src.a as f32 / 255.0;
    let mix = |s: u8, d: u8| -> u8 { (s as f32 * a + d as f32 * (1.0 - a)) as u8 };
    Color::new(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), 255)
}

/// Fixed-size W×H frame, row-major from the top-left. Allocated once.
pub struct Framebuffer {
    pub color_buffer: Vec<u32>,
    pub width: u32,
    pub height: u32,
    upload: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![0; size],
            width,
            height,
            upload: vec![0; size * 4],
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.color_buffer.fill(0);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn set_pixel_color(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.color_buffer[i] = pack_rgb(color);
        }
    }

    /// Black outside the buffer.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        match self.index(x, y) {
            Some(i) => unpack_rgb(self.color_buffer[i]),
            None => Color::new(0, 0, 0, 255),
        }
    }

    /// Alpha-composites `color` over whatever is already at (x, y).
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            let dst = unpack_rgb(self.color_buffer[i]);
            self.color_buffer[i] = pack_rgb(blend(color, dst));
        }
    }

    /// Converts to RGBA8 bytes (opaque) for upload.
    pub fn to_rgba_bytes(&mut self) -> &[u8] {
        for (px, out) in self.color_buffer.iter().zip(self.upload.chunks_exact_mut(4)) {
            out.copy_from_slice(&(px | 0xFF00_0000).to_le_bytes());
        }
        &self.upload
    }

    /// Sube los píxeles a una textura persistente del mismo tamaño (RGBA8).
    pub fn upload_to_texture(&mut self, tex: &mut Texture2D) {
        let bytes = self.to_rgba_bytes();
        let _ = tex.update_texture(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_is_blue_high() {
        let c = Color::new(0x11, 0x22, 0x33, 255);
        assert_eq!(pack_rgb(c), 0x0033_2211);
        assert_eq!(unpack_rgb(0x0033_2211), c);
    }

    #[test]
    fn blend_is_straight_alpha() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel_color(0, 0, Color::new(200, 100, 0, 255));
        fb.blend_pixel(0, 0, Color::new(0, 0, 200, 128));
        let out = fb.get_pixel(0, 0);
        assert!((out.r as i32 - 99).abs() <= 1);
        assert!((out.g as i32 - 49).abs() <= 1);
        assert!((out.b as i32 - 100).abs() <= 1);

        fb.blend_pixel(1, 1, Color::new(10, 20, 30, 255));
        assert_eq!(fb.get_pixel(1, 1), Color::new(10, 20, 30, 255));
    }

    #[test]
    fn writes_outside_are_ignored() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel_color(-1, 0, Color::new(255, 255, 255, 255));
        fb.set_pixel_color(2, 0, Color::new(255, 255, 255, 255));
        assert!(fb.color_buffer.iter().all(|p| *p == 0));
    }

    #[test]
    fn rgba_bytes_keep_channel_order() {
        let mut fb = Framebuffer::new(1, 1);
        fb.set_pixel_color(0, 0, Color::new(1, 2, 3, 255));
        assert_eq!(fb.to_rgba_bytes(), &[1, 2, 3, 255]);
    }
}
