use glam::Vec3;

/// Contact classification for one physics tick, supplied by the collision
/// collaborator. Normals are normalized sums of the contacts in each class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contacts {
    pub ground_count: u32,
    pub steep_count: u32,
    pub ground_normal: Vec3,
    pub steep_normal: Vec3,
    /// Normal of the most recent contact of any kind. Survives airborne ticks.
    pub last_normal: Vec3,
}

impl Default for Contacts {
    fn default() -> Self {
        Self {
            ground_count: 0,
            steep_count: 0,
            ground_normal: Vec3::Y,
            steep_normal: Vec3::ZERO,
            last_normal: Vec3::Y,
        }
    }
}

impl Contacts {
    pub fn on_ground(&self) -> bool {
        self.ground_count > 0
    }

    pub fn on_steep(&self) -> bool {
        self.steep_count > 0
    }

    pub fn add_ground(&mut self, normal: Vec3) {
        if self.ground_count == 0 {
            self.ground_normal = Vec3::ZERO;
        }
        self.ground_count += 1;
        self.ground_normal += normal;
        self.last_normal = normal;
    }

    pub fn add_steep(&mut self, normal: Vec3) {
        self.steep_count += 1;
        self.steep_normal += normal;
        self.last_normal = normal;
    }

    /// Normalize the accumulated normals. Call once after all contacts of a
    /// tick have been added.
    pub fn finish(&mut self) {
        self.ground_normal = if self.on_ground() {
            self.ground_normal.normalize_or(Vec3::Y)
        } else {
            Vec3::Y
        };
        self.steep_normal = self.steep_normal.normalize_or_zero();
    }

    /// Forget this tick's contacts, keeping `last_normal`.
    pub fn clear(&mut self) {
        *self = Self {
            last_normal: self.last_normal,
            ..Self::default()
        };
    }
}

/// Physics material the movement code can ask the body to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceMaterial {
    #[default]
    Default,
    /// Holds the body against whatever it touches.
    Grip,
}

impl SurfaceMaterial {
    /// Fraction of tangential velocity removed per contact per physics tick.
    pub fn grip(self) -> f32 {
        match self {
            Self::Default => 0.0,
            Self::Grip => 1.0,
        }
    }
}

/// The rigid body a movement machine drives. Read once before and written
/// once after each physics tick.
pub trait PhysicsBody {
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn contacts(&self) -> Contacts;
    fn gravity(&self) -> Vec3;
    fn material(&self) -> SurfaceMaterial;
    fn set_material(&mut self, material: SurfaceMaterial);
}
