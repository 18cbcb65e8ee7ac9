//! Room description and picture-frame placement
//!
//! The room is an open box: floor, ceiling, a back wall at -Z and two side
//! walls, with the visitor entering from +Z. Frames are computed once from
//! the number of artworks: a centerpiece on the back wall, then the left
//! wall, then the right wall.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::artwork::Dimensions;
use crate::movement::RoomBounds;

/// Which surface a frame or wall belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wall {
    Back,
    Left,
    Right,
}

/// Room footprint and wall geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSpec {
    /// Extent along X
    pub width: f32,
    /// Extent along Z
    pub depth: f32,
    pub height: f32,
    pub wall_thickness: f32,
    /// How close the visitor may walk to a wall
    pub walk_margin: f32,
}

impl Default for RoomSpec {
    fn default() -> Self {
        Self {
            width: 20.0,
            depth: 20.0,
            height: 10.0,
            wall_thickness: 0.5,
            walk_margin: 1.0,
        }
    }
}

/// A wall box to render, centered at `center` before rotation by `yaw`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    pub wall: Wall,
    pub center: Vec3,
    /// Length along the wall, height, thickness
    pub size: Vec3,
    pub yaw: f32,
}

impl RoomSpec {
    /// Walkable area for the first-person camera
    pub fn walk_bounds(&self) -> RoomBounds {
        RoomBounds::new(
            self.width / 2.0 - self.walk_margin,
            self.depth / 2.0 - self.walk_margin,
        )
    }

    /// Back, left and right walls
    pub fn walls(&self) -> [WallSpec; 3] {
        let half_h = self.height / 2.0;
        [
            WallSpec {
                wall: Wall::Back,
                center: Vec3::new(0.0, half_h, -self.depth / 2.0),
                size: Vec3::new(self.width + self.wall_thickness * 2.0, self.height, self.wall_thickness),
                yaw: 0.0,
            },
            WallSpec {
                wall: Wall::Left,
                center: Vec3::new(-self.width / 2.0, half_h, 0.0),
                size: Vec3::new(self.depth, self.height, self.wall_thickness),
                yaw: FRAC_PI_2,
            },
            WallSpec {
                wall: Wall::Right,
                center: Vec3::new(self.width / 2.0, half_h, 0.0),
                size: Vec3::new(self.depth, self.height, self.wall_thickness),
                yaw: -FRAC_PI_2,
            },
        ]
    }
}

/// Frame dimensions and hanging rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSpec {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Largest canvas that fits inside the frame
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Height of the frame center above the floor
    pub hang_height: f32,
    /// Distance from the wall plane to the frame center
    pub wall_inset: f32,
    /// Center-to-center distance between frames on a side wall
    pub spacing: f32,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            width: 3.0,
            height: 4.0,
            depth: 0.2,
            canvas_width: 2.6,
            canvas_height: 3.6,
            hang_height: 2.5,
            wall_inset: 0.2,
            spacing: 6.0,
        }
    }
}

impl FrameSpec {
    /// Canvas size for an artwork, fitted inside the frame while keeping
    /// the artwork's aspect ratio. Unknown dimensions fill the frame.
    pub fn canvas_size(&self, dimensions: Option<&Dimensions>) -> (f32, f32) {
        let Some(d) = dimensions else {
            return (self.canvas_width, self.canvas_height);
        };
        let aspect = d.aspect();
        if !aspect.is_finite() || aspect <= 0.0 {
            return (self.canvas_width, self.canvas_height);
        }
        let frame_aspect = self.canvas_width / self.canvas_height;
        if aspect > frame_aspect {
            (self.canvas_width, self.canvas_width / aspect)
        } else {
            (self.canvas_height * aspect, self.canvas_height)
        }
    }

    /// Frames that fit along one side wall. The outermost slots stay a
    /// full spacing away from the back wall and the entrance.
    pub fn side_wall_capacity(&self, room: &RoomSpec) -> usize {
        ((room.depth / self.spacing).floor() as usize).saturating_sub(1).max(1)
    }
}

/// Where one artwork hangs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePlacement {
    /// Index into the artwork list
    pub index: usize,
    pub wall: Wall,
    /// Frame center
    pub position: Vec3,
    /// Rotation about +Y; the frame front faces local +Z
    pub yaw: f32,
}

impl FramePlacement {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Unit normal of the frame's front face
    pub fn normal(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Distance along the ray to the frame's front rectangle.
    /// Rays that approach from behind the frame never hit.
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3, frame: &FrameSpec) -> Option<f32> {
        let direction = direction.normalize_or_zero();
        let normal = self.normal();
        let denom = direction.dot(normal);
        if denom >= -f32::EPSILON {
            return None;
        }

        let face_center = self.position + normal * (frame.depth / 2.0);
        let t = (face_center - origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }

        let local = self.rotation().inverse() * (origin + direction * t - self.position);
        (local.x.abs() <= frame.width / 2.0 && local.y.abs() <= frame.height / 2.0).then_some(t)
    }
}

/// Hang `count` artworks: one centerpiece on the back wall, then the left
/// wall back to front, then the right wall. Artworks beyond the room's
/// capacity are not placed.
pub fn layout_frames(room: &RoomSpec, frame: &FrameSpec, count: usize) -> Vec<FramePlacement> {
    let mut placements = Vec::with_capacity(count.min(capacity(room, frame)));
    if count == 0 {
        return placements;
    }

    placements.push(FramePlacement {
        index: 0,
        wall: Wall::Back,
        position: Vec3::new(0.0, frame.hang_height, -room.depth / 2.0 + frame.wall_inset),
        yaw: 0.0,
    });

    let per_wall = frame.side_wall_capacity(room);
    let first_slot = -(per_wall as f32 - 1.0) / 2.0 * frame.spacing;
    let side_x = room.width / 2.0 - frame.wall_inset;

    for (wall, x, yaw) in [(Wall::Left, -side_x, FRAC_PI_2), (Wall::Right, side_x, -FRAC_PI_2)] {
        for slot in 0..per_wall {
            let index = placements.len();
            if index >= count {
                return placements;
            }
            placements.push(FramePlacement {
                index,
                wall,
                position: Vec3::new(x, frame.hang_height, first_slot + slot as f32 * frame.spacing),
                yaw,
            });
        }
    }

    placements
}

/// Total number of frames the room can hold
pub fn capacity(room: &RoomSpec, frame: &FrameSpec) -> usize {
    1 + 2 * frame.side_wall_capacity(room)
}

/// Index of the nearest frame the ray hits
pub fn pick_frame(
    placements: &[FramePlacement],
    origin: Vec3,
    direction: Vec3,
    frame: &FrameSpec,
) -> Option<usize> {
    placements
        .iter()
        .filter_map(|p| p.ray_hit(origin, direction, frame).map(|t| (t, p.index)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, index)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_empty_layout() {
        assert!(layout_frames(&RoomSpec::default(), &FrameSpec::default(), 0).is_empty());
    }

    #[test]
    fn test_default_room_matches_curated_layout() {
        let placements = layout_frames(&RoomSpec::default(), &FrameSpec::default(), 5);
        let expected = [
            (Wall::Back, Vec3::new(0.0, 2.5, -9.8), 0.0),
            (Wall::Left, Vec3::new(-9.8, 2.5, -3.0), FRAC_PI_2),
            (Wall::Left, Vec3::new(-9.8, 2.5, 3.0), FRAC_PI_2),
            (Wall::Right, Vec3::new(9.8, 2.5, -3.0), -FRAC_PI_2),
            (Wall::Right, Vec3::new(9.8, 2.5, 3.0), -FRAC_PI_2),
        ];
        assert_eq!(placements.len(), 5);
        for (i, (p, (wall, pos, yaw))) in placements.iter().zip(expected).enumerate() {
            assert_eq!(p.index, i);
            assert_eq!(p.wall, wall);
            assert!(approx(p.position, pos), "{:?} != {:?}", p.position, pos);
            assert_eq!(p.yaw, yaw);
        }
    }

    #[test]
    fn test_partial_layout_fills_left_wall_first() {
        let placements = layout_frames(&RoomSpec::default(), &FrameSpec::default(), 4);
        let walls: Vec<_> = placements.iter().map(|p| p.wall).collect();
        assert_eq!(walls, vec![Wall::Back, Wall::Left, Wall::Left, Wall::Right]);
    }

    #[test]
    fn test_overflow_is_not_hung() {
        let room = RoomSpec::default();
        let frame = FrameSpec::default();
        assert_eq!(capacity(&room, &frame), 5);
        assert_eq!(layout_frames(&room, &frame, 12).len(), 5);
    }

    #[test]
    fn test_long_hall_holds_more() {
        let hall = RoomSpec {
            depth: 100.0,
            ..RoomSpec::default()
        };
        let frame = FrameSpec::default();
        let per_wall = frame.side_wall_capacity(&hall);
        assert_eq!(per_wall, 15);

        let placements = layout_frames(&hall, &frame, 40);
        assert_eq!(placements.len(), 31);
        // Slots are centered along the hall and stay inside it
        for p in &placements {
            assert!(p.position.z.abs() <= hall.depth / 2.0);
        }
        let left: Vec<f32> = placements
            .iter()
            .filter(|p| p.wall == Wall::Left)
            .map(|p| p.position.z)
            .collect();
        assert!((left[0] + left[left.len() - 1]).abs() < 1e-3);
    }

    #[test]
    fn test_frames_face_into_the_room() {
        for p in layout_frames(&RoomSpec::default(), &FrameSpec::default(), 5) {
            // The normal points back toward the center of the room
            assert!(p.normal().dot(-p.position.with_y(0.0)) > 0.0);
        }
    }

    #[test]
    fn test_walk_bounds_and_walls() {
        let room = RoomSpec::default();
        let bounds = room.walk_bounds();
        assert_eq!((bounds.half_width, bounds.half_depth), (9.0, 9.0));

        let walls = room.walls();
        assert_eq!(walls[0].center, Vec3::new(0.0, 5.0, -10.0));
        assert_eq!(walls[1].center.x, -10.0);
        assert_eq!(walls[2].center.x, 10.0);
    }

    #[test]
    fn test_ray_hits_center_from_the_front() {
        let frame = FrameSpec::default();
        let placements = layout_frames(&RoomSpec::default(), &frame, 5);
        let back = placements[0];

        let origin = Vec3::new(0.0, 2.5, 5.0);
        let t = back.ray_hit(origin, Vec3::NEG_Z, &frame).unwrap();
        assert!((t - (5.0 + 9.8 - 0.1)).abs() < 1e-3);

        // Aimed past the edge
        assert!(back.ray_hit(origin, Vec3::new(0.3, 0.0, -1.0), &frame).is_none());
        // From behind the wall
        assert!(back.ray_hit(Vec3::new(0.0, 2.5, -15.0), Vec3::Z, &frame).is_none());
        // Pointing away
        assert!(back.ray_hit(origin, Vec3::Z, &frame).is_none());
    }

    #[test]
    fn test_pick_side_wall_frame() {
        let frame = FrameSpec::default();
        let placements = layout_frames(&RoomSpec::default(), &frame, 5);

        let origin = Vec3::new(0.0, 1.6, 3.0);
        let toward_left_front = Vec3::new(-9.8, 2.5, 3.0) - origin;
        assert_eq!(pick_frame(&placements, origin, toward_left_front, &frame), Some(2));

        let toward_right_back = Vec3::new(9.8, 2.5, -3.0) - origin;
        assert_eq!(pick_frame(&placements, origin, toward_right_back, &frame), Some(3));

        assert_eq!(pick_frame(&placements, origin, Vec3::Y, &frame), None);
    }

    #[test]
    fn test_canvas_size_keeps_aspect() {
        let frame = FrameSpec::default();
        assert_eq!(frame.canvas_size(None), (2.6, 3.6));

        let landscape: Dimensions = "36x24".parse().unwrap();
        let (w, h) = frame.canvas_size(Some(&landscape));
        assert_eq!(w, 2.6);
        assert!((w / h - 1.5).abs() < 1e-4);

        let tall: Dimensions = "10x40".parse().unwrap();
        let (w, h) = frame.canvas_size(Some(&tall));
        assert_eq!(h, 3.6);
        assert!((w - 0.9).abs() < 1e-4);
    }
}
