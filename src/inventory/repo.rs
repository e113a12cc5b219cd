use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{InventoryItem, InventoryPatch, NewInventoryItem, TruncateOutcome};

const ITEM_COLUMNS: &str = "id, part_number, build_sequence, balloon_number, vendor_no, \
     packing_disk_no, line, po_no, quantity, scanned_by, week, created_at, updated_at";

/// Result of taking one unit off an item.
#[derive(Debug)]
pub enum Decrement {
    Updated(InventoryItem),
    Exhausted,
    NotFound,
}

impl InventoryItem {
    /// All items, newest first; optionally limited to one week.
    pub async fn list(db: &PgPool, week: Option<&str>) -> sqlx::Result<Vec<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
              FROM inventory
             WHERE ($1::text IS NULL OR week = $1)
             ORDER BY created_at DESC, id
            "#
        ))
        .bind(week)
        .fetch_all(db)
        .await
    }

    /// Items whose week label contains any of `needles`, case-insensitively.
    pub async fn list_by_week_containing(
        db: &PgPool,
        needles: &[&str],
    ) -> sqlx::Result<Vec<InventoryItem>> {
        let patterns: Vec<String> = needles
            .iter()
            .map(|n| format!("%{}%", escape_like(n)))
            .collect();
        sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
              FROM inventory
             WHERE week ILIKE ANY($1)
             ORDER BY week, created_at
            "#
        ))
        .bind(patterns)
        .fetch_all(db)
        .await
    }

    pub async fn list_by_packing(db: &PgPool, packing: i64) -> sqlx::Result<Vec<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
              FROM inventory
             WHERE packing_disk_no = $1
             ORDER BY created_at ASC, id
            "#
        ))
        .bind(packing)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, new: &NewInventoryItem) -> anyhow::Result<InventoryItem> {
        let mut tx = db.begin().await.context("begin tx")?;
        let item = insert_item_tx(&mut tx, new).await?;
        tx.commit().await.context("commit tx")?;
        Ok(item)
    }

    /// Insert every row or none.
    pub async fn create_many(
        db: &PgPool,
        rows: &[NewInventoryItem],
    ) -> anyhow::Result<Vec<InventoryItem>> {
        let mut tx = db.begin().await.context("begin tx")?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(insert_item_tx(&mut tx, row).await?);
        }
        tx.commit().await.context("commit tx")?;
        Ok(out)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: &InventoryPatch,
    ) -> sqlx::Result<Option<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
               SET part_number = COALESCE($2, part_number),
                   build_sequence = COALESCE($3, build_sequence),
                   quantity = COALESCE($4, quantity),
                   packing_disk_no = COALESCE($5, packing_disk_no),
                   scanned_by = COALESCE($6, scanned_by),
                   updated_at = now()
             WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.part_number.as_deref())
        .bind(patch.build_sequence)
        .bind(patch.quantity)
        .bind(patch.packing_disk_no)
        .bind(patch.scanned_by.as_deref())
        .fetch_optional(db)
        .await
    }

    /// Take one unit off the item and record who scanned it. Never goes below zero.
    pub async fn decrement(db: &PgPool, id: Uuid, scanned_by: &str) -> sqlx::Result<Decrement> {
        let updated = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
               SET quantity = quantity - 1,
                   scanned_by = $2,
                   updated_at = now()
             WHERE id = $1 AND quantity > 0
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scanned_by)
        .fetch_optional(db)
        .await?;

        if let Some(item) = updated {
            return Ok(Decrement::Updated(item));
        }
        match Self::find_by_id(db, id).await? {
            Some(_) => Ok(Decrement::Exhausted),
            None => Ok(Decrement::NotFound),
        }
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
        let res = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }

    /// Delete a whole week, copying it into `inventory_history` first when asked.
    pub async fn truncate_week(
        db: &PgPool,
        week: &str,
        backup: bool,
    ) -> anyhow::Result<TruncateOutcome> {
        let mut tx = db.begin().await.context("begin tx")?;

        let archived = if backup {
            sqlx::query(&format!(
                r#"
                INSERT INTO inventory_history ({ITEM_COLUMNS})
                SELECT {ITEM_COLUMNS}
                  FROM inventory
                 WHERE week = $1
                "#
            ))
            .bind(week)
            .execute(&mut *tx)
            .await
            .context("archive week")?
            .rows_affected()
        } else {
            0
        };

        let deleted = sqlx::query("DELETE FROM inventory WHERE week = $1")
            .bind(week)
            .execute(&mut *tx)
            .await
            .context("delete week")?
            .rows_affected();

        tx.commit().await.context("commit tx")?;
        Ok(TruncateOutcome { archived, deleted })
    }
}

/// Insert a new item within a transaction.
pub async fn insert_item_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewInventoryItem,
) -> anyhow::Result<InventoryItem> {
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        r#"
        INSERT INTO inventory (id, part_number, build_sequence, balloon_number, vendor_no,
                               packing_disk_no, line, po_no, quantity, scanned_by, week)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new.part_number.as_deref())
    .bind(new.build_sequence)
    .bind(new.balloon_number.as_deref())
    .bind(new.vendor_no)
    .bind(new.packing_disk_no)
    .bind(new.line.as_deref())
    .bind(new.po_no.as_deref())
    .bind(new.quantity)
    .bind(new.scanned_by.as_deref())
    .bind(&new.week)
    .fetch_one(&mut **tx)
    .await
    .context("insert inventory item")?;
    Ok(item)
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("Boa"), "Boa");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
