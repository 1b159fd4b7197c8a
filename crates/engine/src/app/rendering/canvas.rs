use crate::app::Vec2;

/// Mutable view over an RGBA8 frame buffer. Every write is clipped to the
/// frame, so callers may pass coordinates that fall partly or wholly
/// off-screen.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.byte_offset(x, y)?;
        let mut color = [0; 4];
        color.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(color)
    }

    /// Writes one pixel, blending by the source alpha when it is below 255.
    pub fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let target = &mut self.frame[offset..offset + 4];
        match color[3] {
            0 => {}
            255 => target.copy_from_slice(&color),
            alpha => {
                let alpha = u16::from(alpha);
                for channel in 0..3 {
                    let src = u16::from(color[channel]);
                    let dst = u16::from(target[channel]);
                    target[channel] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
                }
                target[3] = 255;
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(self.width as i32);
        let y1 = y.saturating_add(height).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        if width <= 1 || height <= 1 {
            return;
        }
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, y + height - 1, width, 1, color);
        self.fill_rect(x, y + 1, 1, height - 2, color);
        self.fill_rect(x + width - 1, y + 1, 1, height - 2, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: [u8; 4]) {
        self.fill_ellipse(center, radius, radius, color);
    }

    /// Axis-aligned ellipse, sampled at pixel centres.
    pub fn fill_ellipse(&mut self, center: Vec2, radius_x: f32, radius_y: f32, color: [u8; 4]) {
        if !(radius_x > 0.0 && radius_y > 0.0) {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip_box(
            center.x - radius_x,
            center.y - radius_y,
            center.x + radius_x,
            center.y + radius_y,
        ) else {
            return;
        };
        for py in y0..=y1 {
            let dy = (py as f32 + 0.5 - center.y) / radius_y;
            for px in x0..=x1 {
                let dx = (px as f32 + 0.5 - center.x) / radius_x;
                if dx * dx + dy * dy <= 1.0 {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Ring between `radius - thickness` and `radius`.
    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, thickness: f32, color: [u8; 4]) {
        let inner = (radius - thickness).max(0.0);
        let Some((x0, y0, x1, y1)) = self.clip_box(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        ) else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let distance = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(center);
                if distance <= radius && distance >= inner {
                    self.put(px, py, color);
                }
            }
        }
    }

    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [u8; 4]) {
        let area = edge(a, b, c);
        if area == 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip_box(
            a.x.min(b.x).min(c.x),
            a.y.min(b.y).min(c.y),
            a.x.max(b.x).max(c.x),
            a.y.max(b.y).max(c.y),
        ) else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(b, c, p) * area.signum();
                let w1 = edge(c, a, p) * area.signum();
                let w2 = edge(a, b, p) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let pixel = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let offset = pixel.checked_mul(4)?;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    /// Pixel box covering the given float bounds, clipped to the frame.
    fn clip_box(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<(i32, i32, i32, i32)> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return None;
        }
        let x0 = (min_x.floor() as i32).max(0);
        let y0 = (min_y.floor() as i32).max(0);
        let x1 = (max_x.ceil() as i32).min(self.width as i32 - 1);
        let y1 = (max_y.ceil() as i32).min(self.height as i32 - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Scales RGB by `factor`, saturating at 255.
pub fn brighten(color: [u8; 4], factor: f32) -> [u8; 4] {
    let scale = |channel: u8| (f32::from(channel) * factor).round().clamp(0.0, 255.0) as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
}

pub fn with_alpha(color: [u8; 4], alpha: f32) -> [u8; 4] {
    [
        color[0],
        color[1],
        color[2],
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}
