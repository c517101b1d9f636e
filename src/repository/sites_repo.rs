// ==========================================
// Planification bloc opératoire - Repositories sites / secteurs / salles
// ==========================================

use crate::domain::sites::{OperatingRoom, Sector, SectorRules, Site};
use crate::domain::types::{RoomKind, SectorCategory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::bad_enum;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SiteRepository
// ==========================================
pub struct SiteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SiteRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, site: &Site) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO site (site_id, name, timezone, color_code, is_active)
               VALUES (?, ?, ?, ?, ?)"#,
            params![
                &site.site_id,
                &site.name,
                &site.timezone,
                &site.color_code,
                site.is_active as i32,
            ],
        )?;

        Ok(site.site_id.clone())
    }

    pub fn find_by_id(&self, site_id: &str) -> RepositoryResult<Option<Site>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT site_id, name, timezone, color_code, is_active FROM site WHERE site_id = ?",
            params![site_id],
            |row| {
                Ok(Site {
                    site_id: row.get(0)?,
                    name: row.get(1)?,
                    timezone: row.get(2)?,
                    color_code: row.get(3)?,
                    is_active: row.get::<_, i32>(4)? != 0,
                })
            },
        ) {
            Ok(site) => Ok(Some(site)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ==========================================
// SectorRepository
// ==========================================
// Le blob rules_json est décodé en SectorRules au chargement; un blob
// invalide donne les règles par défaut plutôt qu'un échec de lecture.
pub struct SectorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SectorRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, sector: &Sector) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO sector (sector_id, site_id, name, category, color_code, is_active, rules_json)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &sector.sector_id,
                &sector.site_id,
                &sector.name,
                sector.category.to_db_str(),
                &sector.color_code,
                sector.is_active as i32,
                sector.rules.to_json(),
            ],
        )?;

        Ok(sector.sector_id.clone())
    }

    pub fn find_by_id(&self, sector_id: &str) -> RepositoryResult<Option<Sector>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT sector_id, site_id, name, category, color_code, is_active, rules_json
               FROM sector WHERE sector_id = ?"#,
            params![sector_id],
            Self::map_row,
        ) {
            Ok(sector) => Ok(Some(sector)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_site(&self, site_id: &str) -> RepositoryResult<Vec<Sector>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT sector_id, site_id, name, category, color_code, is_active, rules_json
               FROM sector WHERE site_id = ? ORDER BY name"#,
        )?;

        let sectors = stmt
            .query_map(params![site_id], Self::map_row)?
            .collect::<Result<Vec<Sector>, _>>()?;

        Ok(sectors)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Sector> {
        let category_raw: String = row.get(3)?;
        let category = SectorCategory::from_db_str(&category_raw)
            .ok_or_else(|| bad_enum(3, "catégorie de secteur", &category_raw))?;
        let rules_json: Option<String> = row.get(6)?;

        Ok(Sector {
            sector_id: row.get(0)?,
            site_id: row.get(1)?,
            name: row.get(2)?,
            category,
            color_code: row.get(4)?,
            is_active: row.get::<_, i32>(5)? != 0,
            rules: SectorRules::from_json(rules_json.as_deref()),
        })
    }
}

// ==========================================
// OperatingRoomRepository
// ==========================================
pub struct OperatingRoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OperatingRoomRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, room: &OperatingRoom) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO operating_room (room_id, sector_id, name, number, kind, is_active)
               VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                &room.room_id,
                &room.sector_id,
                &room.name,
                room.number,
                room.kind.to_db_str(),
                room.is_active as i32,
            ],
        )?;

        Ok(room.room_id.clone())
    }

    pub fn find_by_id(&self, room_id: &str) -> RepositoryResult<Option<OperatingRoom>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT room_id, sector_id, name, number, kind, is_active
               FROM operating_room WHERE room_id = ?"#,
            params![room_id],
            Self::map_row,
        ) {
            Ok(room) => Ok(Some(room)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_sector(&self, sector_id: &str) -> RepositoryResult<Vec<OperatingRoom>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT room_id, sector_id, name, number, kind, is_active
               FROM operating_room WHERE sector_id = ? ORDER BY number"#,
        )?;

        let rooms = stmt
            .query_map(params![sector_id], Self::map_row)?
            .collect::<Result<Vec<OperatingRoom>, _>>()?;

        Ok(rooms)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<OperatingRoom> {
        let kind_raw: String = row.get(4)?;
        let kind = RoomKind::from_db_str(&kind_raw)
            .ok_or_else(|| bad_enum(4, "type de salle", &kind_raw))?;

        Ok(OperatingRoom {
            room_id: row.get(0)?,
            sector_id: row.get(1)?,
            name: row.get(2)?,
            number: row.get(3)?,
            kind,
            is_active: row.get::<_, i32>(5)? != 0,
        })
    }
}
