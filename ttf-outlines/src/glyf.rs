//! Loading every glyph in the `glyf` table, resolving composites.

use ttf_read::tables::{
    glyf::{Component, Glyf, Glyph},
    loca::Loca,
};

use crate::{outline::Outline, GlyphId, LoadError, GLYF_COMPOSITE_RECURSION_LIMIT};

/// A glyph slot between the two loading passes.
enum Slot {
    Resolved(Outline),
    Pending {
        components: Vec<Component>,
        instructions: Vec<u8>,
    },
}

/// Loads the outlines of all `num_glyphs` glyphs.
///
/// The first pass decodes simple and empty glyphs and extracts the
/// component records of composites. The second pass resolves composites
/// children first, using an explicit stack in place of recursion.
pub(crate) fn load_outlines(
    loca: &Loca,
    glyf: &Glyf,
    num_glyphs: u16,
) -> Result<Vec<Outline>, LoadError> {
    let mut slots = (0..num_glyphs)
        .map(|gid| read_slot(loca, glyf, GlyphId::new(gid)))
        .collect::<Result<Vec<_>, _>>()?;
    let num_pending = slots
        .iter()
        .filter(|slot| matches!(slot, Slot::Pending { .. }))
        .count();
    for gid in 0..num_glyphs {
        resolve(&mut slots, GlyphId::new(gid))?;
    }
    log::debug!("loaded {num_glyphs} glyphs, {num_pending} of them composite");
    Ok(slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Resolved(outline) => Some(outline),
            Slot::Pending { .. } => None,
        })
        .collect())
}

fn read_slot(loca: &Loca, glyf: &Glyf, gid: GlyphId) -> Result<Slot, LoadError> {
    let slot = match loca.get_glyf(gid, glyf)? {
        None => Slot::Resolved(Outline::empty(gid)),
        Some(Glyph::Simple(glyph)) => Slot::Resolved(Outline::from_simple(gid, &glyph)?),
        Some(Glyph::Composite(glyph)) => Slot::Pending {
            components: glyph.components().collect::<Result<_, _>>()?,
            instructions: glyph.instructions()?.unwrap_or_default().to_vec(),
        },
    };
    Ok(slot)
}

/// Resolves `root` and every composite it depends on.
fn resolve(slots: &mut [Slot], root: GlyphId) -> Result<(), LoadError> {
    let mut stack = vec![root];
    while let Some(&gid) = stack.last() {
        let Some(Slot::Pending { components, .. }) = slots.get(gid.to_usize()) else {
            stack.pop();
            continue;
        };
        match next_pending_child(slots, components)? {
            Some(child) => {
                if stack.contains(&child) {
                    return Err(LoadError::CycleDetected(child));
                }
                if stack.len() >= GLYF_COMPOSITE_RECURSION_LIMIT {
                    return Err(LoadError::RecursionLimitExceeded(child));
                }
                stack.push(child);
            }
            None => {
                let outline = compose(slots, gid)?;
                slots[gid.to_usize()] = Slot::Resolved(outline);
                stack.pop();
            }
        }
    }
    Ok(())
}

/// Returns the first component glyph that still needs resolving.
fn next_pending_child(
    slots: &[Slot],
    components: &[Component],
) -> Result<Option<GlyphId>, LoadError> {
    for component in components {
        match slots.get(component.glyph.to_usize()) {
            None => return Err(LoadError::GlyphNotFound(component.glyph)),
            Some(Slot::Pending { .. }) => return Ok(Some(component.glyph)),
            Some(Slot::Resolved(_)) => (),
        }
    }
    Ok(None)
}

/// Builds the outline of a composite whose components are all resolved.
fn compose(slots: &[Slot], gid: GlyphId) -> Result<Outline, LoadError> {
    let Some(Slot::Pending {
        components,
        instructions,
    }) = slots.get(gid.to_usize())
    else {
        return Err(LoadError::GlyphNotFound(gid));
    };
    let mut outline = Outline::empty(gid);
    for component in components {
        let Some(Slot::Resolved(child)) = slots.get(component.glyph.to_usize()) else {
            return Err(LoadError::CycleDetected(component.glyph));
        };
        outline.append_component(child, component)?;
    }
    outline.instructions.clone_from(instructions);
    Ok(outline)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ttf_read::{
        tables::glyf::Glyf,
        types::{BoundingBox, F2Dot14},
        FontData, FontRead,
    };
    use ttf_test_data::glyf::{CompositeGlyphBuilder, GlyfLocaBuilder, SimpleGlyphBuilder};

    use super::*;
    use crate::OutlinePoint;

    fn load(glyphs: &[Vec<u8>]) -> Result<Vec<Outline>, LoadError> {
        let mut builder = GlyfLocaBuilder::new();
        for glyph in glyphs {
            builder.add_glyph(glyph);
        }
        let (glyf, loca) = builder.build(true);
        let loca = Loca::read(FontData::new(&loca), true)?;
        let glyf = Glyf::read(FontData::new(&glyf))?;
        load_outlines(&loca, &glyf, glyphs.len() as u16)
    }

    fn triangle() -> Vec<u8> {
        SimpleGlyphBuilder::new()
            .contour(&[(0, 0, true), (5, 10, true), (10, 0, true)])
            .build()
    }

    fn two_contours() -> Vec<u8> {
        SimpleGlyphBuilder::new()
            .contour(&[(0, 0, true), (1, 0, true), (1, 1, true), (0, 1, true)])
            .contour(&[(2, 2, false), (3, 3, true)])
            .build()
    }

    fn offset(components: &[(u16, i16, i16)]) -> Vec<u8> {
        components
            .iter()
            .fold(CompositeGlyphBuilder::new(), |builder, (gid, dx, dy)| {
                builder.offset(GlyphId::new(*gid), *dx, *dy)
            })
            .build()
    }

    #[test]
    fn composite_is_concatenation() {
        let outlines = load(&[
            Vec::new(),
            triangle(),
            two_contours(),
            offset(&[(1, 0, 0), (2, 100, 0)]),
        ])
        .unwrap();
        let (c1, c2, composite) = (&outlines[1], &outlines[2], &outlines[3]);
        assert_eq!(composite.glyph_id, GlyphId::new(3));
        assert_eq!(composite.points.len(), c1.points.len() + c2.points.len());
        let shift = c1.points.len() as u16;
        let expected_ends = c1
            .contour_ends
            .iter()
            .copied()
            .chain(c2.contour_ends.iter().map(|end| end + shift))
            .collect::<Vec<_>>();
        assert_eq!(composite.contour_ends, expected_ends);
        assert_eq!(composite.points[3], OutlinePoint::new(100, 0, true));
        assert_eq!(
            composite.bounds,
            BoundingBox {
                x_min: 0,
                y_min: 0,
                x_max: 103,
                y_max: 10
            }
        );
        assert_eq!(
            composite.contour_ends.last().copied(),
            Some(composite.points.len() as u16 - 1)
        );
    }

    #[test]
    fn composites_resolve_children_first() {
        // glyph 1 refers forward to glyph 3, which is itself a composite
        let outlines = load(&[
            triangle(),
            CompositeGlyphBuilder::new()
                .scaled(GlyphId::new(3), 1, 1, F2Dot14::from_f32(0.5))
                .instructions(&[1, 2, 3])
                .build(),
            Vec::new(),
            offset(&[(0, 10, 0), (2, 0, 0), (0, 0, 10)]),
        ])
        .unwrap();
        assert_eq!(outlines[3].points.len(), 6);
        let nested = &outlines[1];
        assert_eq!(nested.points.len(), 6);
        // (10, 0) scaled by a half then moved by (1, 1)
        assert_eq!(nested.points[0], OutlinePoint::new(6, 1, true));
        assert_eq!(nested.instructions, [1, 2, 3]);
        assert!(outlines[2].is_empty());
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let result = load(&[triangle(), offset(&[(0, 0, 0), (1, 5, 5)])]);
        assert_eq!(result, Err(LoadError::CycleDetected(GlyphId::new(1))));
    }

    #[test]
    fn indirect_cycle() {
        let result = load(&[
            triangle(),
            offset(&[(2, 0, 0)]),
            offset(&[(3, 0, 0)]),
            offset(&[(0, 0, 0), (1, 0, 0)]),
        ]);
        assert!(matches!(result, Err(LoadError::CycleDetected(_))));
    }

    #[test]
    fn missing_component() {
        let result = load(&[triangle(), offset(&[(0, 0, 0), (9, 0, 0)])]);
        assert_eq!(result, Err(LoadError::GlyphNotFound(GlyphId::new(9))));
    }

    #[test]
    fn nesting_limit() {
        let chain = |depth: u16| {
            let mut glyphs = vec![triangle()];
            for gid in 1..=depth {
                glyphs.push(offset(&[(gid - 1, 1, 0)]));
            }
            load(&glyphs)
        };
        let limit = GLYF_COMPOSITE_RECURSION_LIMIT as u16;
        let outlines = chain(limit).unwrap();
        assert_eq!(outlines.last().unwrap().points[0].x, limit as i32);
        // loading the chain from the top: the deepest composite is
        // reached with the stack already full
        let mut glyphs = vec![triangle()];
        for gid in 1..=limit + 1 {
            glyphs.push(offset(&[(gid + 1, 0, 0)]));
        }
        glyphs.pop();
        glyphs.push(offset(&[(0, 0, 0)]));
        assert!(matches!(
            load(&glyphs),
            Err(LoadError::RecursionLimitExceeded(_))
        ));
    }

    #[test]
    fn truncated_composite_fails() {
        let mut composite = offset(&[(0, 0, 0), (0, 0, 0)]);
        composite.truncate(composite.len() - 2);
        let result = load(&[triangle(), composite]);
        assert_eq!(
            result,
            Err(LoadError::Read(ttf_read::ReadError::TruncatedData))
        );
    }
}
