use std::fmt;

/// Which of the three account-store files a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Shadow,
    Passwd,
    Group,
}

impl StoreKind {
    /// Number of colon-separated fields a record of this kind carries.
    pub fn field_count(self) -> usize {
        match self {
            Self::Shadow => 8,
            Self::Passwd => 7,
            Self::Group => 4,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shadow => write!(f, "shadow"),
            Self::Passwd => write!(f, "passwd"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// One line of the shadow store:
/// `name:hash:lastchange:min:max:warn:inactive:expire`.
///
/// Day counters are `None` when the field was empty on disk or held the
/// negative out-of-range sentinel; both serialize back to an empty field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRecord {
    pub name: String,
    /// Opaque hash string; may be a locked sentinel such as `*` or `!`.
    pub hash: String,
    pub last_change: Option<i64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub warn_days: Option<i64>,
    pub inactive_days: Option<i64>,
    pub expire_day: Option<i64>,
}

impl ShadowRecord {
    /// Serialize back to a shadow line, trailing newline included.
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}:{}:{}\n",
            self.name,
            self.hash,
            day(self.last_change),
            day(self.min_days),
            day(self.max_days),
            day(self.warn_days),
            day(self.inactive_days),
            day(self.expire_day),
        )
    }
}

/// One line of the passwd store:
/// `name:password:uid:gid:gecos:home:shell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdRecord {
    pub name: String,
    /// Historical placeholder, almost always `x`.
    pub password: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: String,
    pub shell: String,
}

impl PasswdRecord {
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}:{}\n",
            self.name, self.password, self.uid, self.gid, self.gecos, self.home, self.shell,
        )
    }
}

/// One line of the group store: `name:password:gid:member,member,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub name: String,
    pub password: String,
    pub gid: u32,
    /// The raw comma-separated member list, kept verbatim so untouched
    /// members round-trip byte-for-byte.
    pub members: String,
}

impl GroupRecord {
    pub fn to_line(&self) -> String {
        format!("{}:{}:{}:{}\n", self.name, self.password, self.gid, self.members)
    }

    /// Member usernames as whole tokens.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.split(',').filter(|m| !m.is_empty())
    }
}

fn day(field: Option<i64>) -> String {
    field.map(|d| d.to_string()).unwrap_or_default()
}
