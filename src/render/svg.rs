use super::{Anchor, Primitive, Scene};

impl Scene {
    /// Serialize as a standalone animated SVG document.
    ///
    /// Pulses loop with SMIL: each one waits `delay`, crosses its edge in
    /// `travel` seconds and rests for the remainder of its period.
    pub fn to_svg(&self) -> String {
        let content: Vec<String> = self.primitives.iter().map(primitive_svg).collect();
        self.wrap_svg(&self.defs(), &content.join("\n  "))
    }

    fn defs(&self) -> String {
        let mut defs = String::from("<defs>\n");

        if self.glow {
            // Soft glow filter - used for node halos
            defs.push_str(
                r#"    <filter id="softGlow" x="-100%" y="-100%" width="300%" height="300%">
      <feGaussianBlur in="SourceGraphic" stdDeviation="6.0" result="blur"/>
      <feMerge>
        <feMergeNode in="blur"/>
        <feMergeNode in="SourceGraphic"/>
      </feMerge>
    </filter>
"#,
            );
        }

        // Pulse filter - subtler blur so signals read as light
        defs.push_str(
            r#"    <filter id="pulseGlow" x="-200%" y="-200%" width="500%" height="500%">
      <feGaussianBlur in="SourceGraphic" stdDeviation="1.5" result="blur"/>
      <feMerge>
        <feMergeNode in="blur"/>
        <feMergeNode in="SourceGraphic"/>
      </feMerge>
    </filter>
"#,
        );

        defs.push_str("  </defs>");
        defs
    }

    fn wrap_svg(&self, defs: &str, content: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">
  {}
  <!-- Background -->
  <rect width="100%" height="100%" fill="{}"/>
  <!-- Diagram content -->
  {}
</svg>"#,
            self.width,
            self.height,
            self.width,
            self.height,
            defs,
            escape(&self.background),
            content
        )
    }
}

fn primitive_svg(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            width,
            opacity,
            dashed,
        } => {
            let dash = if *dashed {
                r#" stroke-dasharray="4 3""#
            } else {
                ""
            };
            format!(
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.2}" opacity="{:.2}"{}/>"#,
                x1,
                y1,
                x2,
                y2,
                escape(stroke),
                width,
                opacity,
                dash
            )
        }
        Primitive::Glow { cx, cy, r, color } => format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" opacity="0.35" filter="url(#softGlow)"/>"#,
            cx,
            cy,
            r,
            escape(color)
        ),
        Primitive::Circle { cx, cy, r, fill } => format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            cx,
            cy,
            r,
            escape(fill)
        ),
        Primitive::Text {
            x,
            y,
            text,
            color,
            size,
            anchor,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
            };
            format!(
                r#"<text x="{:.1}" y="{:.1}" fill="{}" font-size="{:.0}" font-family="ui-sans-serif, system-ui, sans-serif" text-anchor="{}">{}</text>"#,
                x,
                y,
                escape(color),
                size,
                anchor,
                escape(text)
            )
        }
        Primitive::Pulse {
            edge_id,
            x1,
            y1,
            x2,
            y2,
            r,
            color,
            delay,
            travel,
            period,
        } => {
            // Fraction of the loop spent moving; the rest is the pause.
            let moving = if *period > 0.0 {
                (travel / period).clamp(0.0, 1.0)
            } else {
                1.0
            };
            format!(
                r#"<circle data-edge="{}" r="{:.1}" fill="{}" opacity="0" filter="url(#pulseGlow)">
    <animateMotion path="M{:.1},{:.1} L{:.1},{:.1}" begin="{:.3}s" dur="{:.3}s" keyPoints="0;1;1" keyTimes="0;{:.4};1" calcMode="linear" repeatCount="indefinite"/>
    <animate attributeName="opacity" values="1;1;0;0" keyTimes="0;{:.4};{:.4};1" begin="{:.3}s" dur="{:.3}s" repeatCount="indefinite"/>
  </circle>"#,
                edge_id,
                r,
                escape(color),
                x1,
                y1,
                x2,
                y2,
                delay,
                period,
                moving,
                moving,
                moving,
                delay,
                period
            )
        }
    }
}

/// Escape text for use in XML content and attribute values.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
